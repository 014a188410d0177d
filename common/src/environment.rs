use std::fmt;

use serde::{Deserialize, Serialize};

/// User-agent fragments that identify a mobile browser (matched case-insensitively).
const MOBILE_MARKERS: &[&str] = &[
    "android",
    "webos",
    "iphone",
    "ipad",
    "ipod",
    "blackberry",
    "iemobile",
    "opera mini",
];

/// Where the page is running, which decides how `connect` behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Environment {
    /// A wallet extension injected a provider into the page.
    Extension,
    /// Mobile browser without an injected provider; connect via deep link.
    Mobile,
    /// Desktop browser with no wallet installed.
    DesktopNoWallet,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Extension => write!(f, "extension"),
            Environment::Mobile => write!(f, "mobile"),
            Environment::DesktopNoWallet => write!(f, "desktop-no-wallet"),
        }
    }
}

/// What the host page reports about itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeContext {
    pub has_injected_provider: bool,
    pub user_agent: String,
}

impl RuntimeContext {
    pub fn new(has_injected_provider: bool, user_agent: impl Into<String>) -> Self {
        Self {
            has_injected_provider,
            user_agent: user_agent.into(),
        }
    }
}

pub fn is_mobile_user_agent(user_agent: &str) -> bool {
    let ua = user_agent.to_ascii_lowercase();
    MOBILE_MARKERS.iter().any(|marker| ua.contains(marker))
}

/// Classify the runtime. An injected provider wins over a mobile user agent.
pub fn detect_environment(ctx: &RuntimeContext) -> Environment {
    if ctx.has_injected_provider {
        Environment::Extension
    } else if is_mobile_user_agent(&ctx.user_agent) {
        Environment::Mobile
    } else {
        Environment::DesktopNoWallet
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DESKTOP_UA: &str =
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0 Safari/537.36";
    const IPHONE_UA: &str =
        "Mozilla/5.0 (iPhone; CPU iPhone OS 17_5 like Mac OS X) AppleWebKit/605.1.15 Mobile/15E148";

    #[test]
    fn injected_provider_means_extension() {
        let ctx = RuntimeContext::new(true, DESKTOP_UA);
        assert_eq!(detect_environment(&ctx), Environment::Extension);
        // MetaMask's in-app browser is mobile but injects a provider.
        let ctx = RuntimeContext::new(true, IPHONE_UA);
        assert_eq!(detect_environment(&ctx), Environment::Extension);
    }

    #[test]
    fn mobile_user_agents_are_detected() {
        assert_eq!(
            detect_environment(&RuntimeContext::new(false, IPHONE_UA)),
            Environment::Mobile
        );
        for ua in ["Linux; Android 14", "Opera Mini/8.0", "BlackBerry9700", "IEMobile/10.0"] {
            assert!(is_mobile_user_agent(ua), "{ua} should be mobile");
        }
    }

    #[test]
    fn plain_desktop_has_no_wallet() {
        let ctx = RuntimeContext::new(false, DESKTOP_UA);
        assert_eq!(detect_environment(&ctx), Environment::DesktopNoWallet);
        assert_eq!(
            detect_environment(&RuntimeContext::default()),
            Environment::DesktopNoWallet
        );
    }
}
