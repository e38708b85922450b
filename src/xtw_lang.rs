// Multi-language support module
// Provides localized UI strings for English and Chinese with an extensible design

#[derive(Clone)]
pub struct Assets {
    // Menu items
    pub menu_help: &'static str,
    pub menu_new: &'static str,
    pub menu_options: &'static str,
    pub menu_about: &'static str,
    pub menu_exit: &'static str,

    // Start panel
    pub start_title: &'static str,
    pub start_hint: &'static str,

    // Game over panel
    pub over_title: &'static str,
    pub over_message: &'static str,
    pub over_score_fmt: &'static str, // "Final score: {}"

    // Options modal
    pub opt_show_indicator: &'static str,
    pub opt_ascii_icons: &'static str,
    pub opt_language: &'static str,

    // Help modal
    pub help_controls: &'static str,
    pub help_move: &'static str,
    pub help_whack: &'static str,
    pub help_goal: &'static str,
    pub help_miss: &'static str,

    // About modal
    pub about_description: &'static str,
    pub about_version_fmt: &'static str, // "v{} by {}"

    // Status bar
    pub status_fmt: &'static str, // " Score: {}   Misses: {}/{} "

    // Buttons
    pub btn_start: &'static str,
    pub btn_restart: &'static str,
    pub btn_quit: &'static str,
    pub btn_ok: &'static str,
    pub btn_close: &'static str,

    // Terminal size messages
    pub tsmsg_line1: &'static str,
    pub tsmsg_line2: &'static str,
    pub tsmsg_title: &'static str,

    // Language names for selection
    pub lang_english: &'static str,
    pub lang_chinese: &'static str,
}

/// Returns English language assets
pub fn english_assets() -> Assets {
    Assets {
        // Menu items
        menu_help: "Help",
        menu_new: "New",
        menu_options: "Options",
        menu_about: "About",
        menu_exit: "Exit",

        // Start panel
        start_title: "WHACK-A-MOLE",
        start_hint: "A mole pops up every second. Whack it!",

        // Game over panel
        over_title: "Game Over",
        over_message: "Too many misses!",
        over_score_fmt: "Final score: {}",

        // Options modal
        opt_show_indicator: "Show indicator",
        opt_ascii_icons: "ASCII icons",
        opt_language: "🌐 Language",

        // Help modal
        help_controls: " Controls:",
        help_move: "  Mouse | Arrows  - move cursor",
        help_whack: "  L-Click | Space - whack",
        help_goal: " Each whacked mole scores 10 points.",
        help_miss: " 5 whacks on empty cells end the game.",

        // About modal
        about_description: "A terminal-based Whack-A-Mole arcade game",
        about_version_fmt: "v{} by {}",

        // Status bar
        status_fmt: " Score: {}   Misses: {}/{} ",

        // Buttons
        btn_start: " START ",
        btn_restart: " RESTART ",
        btn_quit: " QUIT ",
        btn_ok: " OK ",
        btn_close: " CLOSE ",

        // Terminal size messages
        tsmsg_line1: "Terminal layout too small",
        tsmsg_line2: "Minimum size required: {} x {}",
        tsmsg_title: "Resize needed",

        // Language names
        lang_english: "English",
        lang_chinese: "中文",
    }
}

/// Returns Chinese language assets
pub fn chinese_assets() -> Assets {
    Assets {
        // Menu items
        menu_help: "帮助",
        menu_new: "新游戏",
        menu_options: "选项",
        menu_about: "关于",
        menu_exit: "退出",

        // Start panel
        start_title: "打地鼠",
        start_hint: "地鼠每秒冒头一次，快敲它！",

        // Game over panel
        over_title: "游戏结束",
        over_message: "失误太多了！",
        over_score_fmt: "最终得分：{}",

        // Options modal
        opt_show_indicator: "显示游标",
        opt_ascii_icons: "ASCII图标",
        opt_language: "🌐 语言",

        // Help modal
        help_controls: " 操作说明：",
        help_move: "  鼠标 | 方向键   - 移动光标",
        help_whack: "  左键 | 空格     - 敲击",
        help_goal: " 每敲中一只地鼠得 10 分。",
        help_miss: " 敲空格子累计 5 次则游戏结束。",

        // About modal
        about_description: "一款基于终端的打地鼠街机游戏",
        about_version_fmt: "v{} 作者 {}",

        // Status bar
        status_fmt: " 得分：{}   失误：{}/{} ",

        // Buttons
        btn_start: " 开始 ",
        btn_restart: " 重玩 ",
        btn_quit: " 退出 ",
        btn_ok: " 确定 ",
        btn_close: " 关闭 ",

        // Terminal size messages
        tsmsg_line1: "终端屏幕布局过小",
        tsmsg_line2: "最小需要尺寸：{} x {}",
        tsmsg_title: "需要调整大小",

        // Language names
        lang_english: "English",
        lang_chinese: "中文",
    }
}

/// Main language manager struct
/// Holds the current language code and active string assets
pub struct Lang {
    pub current_lang: String,
    pub assets: Assets,
}

impl Lang {
    /// Creates a new Lang instance from a language code
    /// Normalizes input (e.g., "zh-CN" → "zh") and defaults to English for unsupported languages
    pub fn new(lang_code: &str) -> Self {
        let normalized = lang_code.to_lowercase();
        let code = if normalized.starts_with("zh") {
            "zh"
        } else {
            "en"
        };

        Lang {
            current_lang: code.to_string(),
            assets: if code == "zh" {
                chinese_assets()
            } else {
                english_assets()
            },
        }
    }

    /// Switches the current language and reloads all string assets
    /// Used when the user changes language in the options menu
    pub fn switch_to(&mut self, lang_code: &str) {
        let normalized = lang_code.to_lowercase();
        let code = if normalized.starts_with("zh") {
            "zh"
        } else {
            "en"
        };

        self.current_lang = code.to_string();
        self.assets = if code == "zh" {
            chinese_assets()
        } else {
            english_assets()
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_codes_normalize_to_supported_languages() {
        assert_eq!(Lang::new("zh-CN").current_lang, "zh");
        assert_eq!(Lang::new("en-US").current_lang, "en");
        assert_eq!(Lang::new("fr-FR").current_lang, "en");
    }

    #[test]
    fn switch_to_reloads_assets() {
        let mut lang = Lang::new("en");
        assert_eq!(lang.assets.menu_exit, "Exit");
        lang.switch_to("zh");
        assert_eq!(lang.assets.menu_exit, "退出");
    }
}
