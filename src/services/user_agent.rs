//! User-Agent 解析
//!
//! 基于 woothee，把 UA 字符串归类为浏览器、操作系统和设备类型。

use woothee::parser::Parser;

const UNKNOWN: &str = "Unknown";

/// 设备信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub browser: String,
    pub version: String,
    pub operating_system: String,
    /// Bot / Tablet / Mobile / Desktop
    pub device: String,
    pub mobile: bool,
    pub bot: bool,
}

impl DeviceInfo {
    /// 访问日志中记录的浏览器名："{name} {version}"
    pub fn browser_label(&self) -> String {
        if self.version.is_empty() {
            self.browser.clone()
        } else {
            format!("{} {}", self.browser, self.version)
        }
    }
}

fn known_or_unknown(value: &str) -> String {
    if value.is_empty() || value == "UNKNOWN" {
        UNKNOWN.to_string()
    } else {
        value.to_string()
    }
}

/// 解析 UA 字符串
pub fn parse_user_agent(ua_string: &str) -> DeviceInfo {
    let parser = Parser::new();
    let result = parser.parse(ua_string).unwrap_or_default();

    let bot = result.category == "crawler";
    let mobile = matches!(result.category, "smartphone" | "mobilephone");

    let device = if bot {
        "Bot"
    } else if mobile {
        if result.os == "iPad" || ua_string.contains("iPad") {
            "Tablet"
        } else {
            "Mobile"
        }
    } else {
        "Desktop"
    };

    DeviceInfo {
        browser: known_or_unknown(&result.name),
        version: if result.version == "UNKNOWN" {
            String::new()
        } else {
            result.version.to_string()
        },
        operating_system: known_or_unknown(&result.os),
        device: device.to_string(),
        mobile,
        bot,
    }
}

/// 是否爬虫
#[inline]
pub fn is_bot(ua_string: &str) -> bool {
    parse_user_agent(ua_string).bot
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHROME_WIN: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
    const IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";
    const IPAD: &str = "Mozilla/5.0 (iPad; CPU OS 16_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.0 Mobile/15E148 Safari/604.1";
    const GOOGLEBOT: &str =
        "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)";

    #[test]
    fn test_desktop_browser() {
        let info = parse_user_agent(CHROME_WIN);
        assert_eq!(info.browser, "Chrome");
        assert_eq!(info.device, "Desktop");
        assert!(!info.mobile);
        assert!(!info.bot);
        assert!(info.browser_label().starts_with("Chrome 120"));
    }

    #[test]
    fn test_mobile_and_tablet() {
        assert_eq!(parse_user_agent(IPHONE).device, "Mobile");
        assert_eq!(parse_user_agent(IPAD).device, "Tablet");
    }

    #[test]
    fn test_bot() {
        let info = parse_user_agent(GOOGLEBOT);
        assert!(info.bot);
        assert_eq!(info.device, "Bot");
        assert!(is_bot(GOOGLEBOT));
    }

    #[test]
    fn test_empty_user_agent() {
        let info = parse_user_agent("");
        assert_eq!(info.browser, "Unknown");
        assert_eq!(info.operating_system, "Unknown");
        assert_eq!(info.device, "Desktop");
        assert_eq!(info.browser_label(), "Unknown");
    }
}
