//! Stealth evasion JavaScript and fingerprint profiles.
//! Based on puppeteer-extra-plugin-stealth techniques.

use crate::utils::random;

/// A self-consistent browser identity. The user agent, `navigator.platform`
/// and WebGL strings must agree or fingerprinting scripts notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FingerprintProfile {
    pub user_agent: &'static str,
    /// `navigator.platform` value.
    pub platform: &'static str,
    /// Platform sent with the CDP user-agent override (client hints).
    pub ua_platform: &'static str,
    pub webgl_vendor: &'static str,
    pub webgl_renderer: &'static str,
}

pub const FINGERPRINT_PROFILES: &[FingerprintProfile] = &[
    FingerprintProfile {
        user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
        platform: "Win32",
        ua_platform: "Windows",
        webgl_vendor: "Google Inc. (Intel)",
        webgl_renderer: "ANGLE (Intel, Intel(R) UHD Graphics 630 Direct3D11 vs_5_0 ps_5_0, D3D11)",
    },
    FingerprintProfile {
        user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/130.0.0.0 Safari/537.36",
        platform: "Win32",
        ua_platform: "Windows",
        webgl_vendor: "Google Inc. (NVIDIA)",
        webgl_renderer: "ANGLE (NVIDIA, NVIDIA GeForce GTX 1660 SUPER Direct3D11 vs_5_0 ps_5_0, D3D11)",
    },
    FingerprintProfile {
        user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
        platform: "MacIntel",
        ua_platform: "macOS",
        webgl_vendor: "Intel Inc.",
        webgl_renderer: "Intel Iris OpenGL Engine",
    },
    FingerprintProfile {
        user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
        platform: "Linux x86_64",
        ua_platform: "Linux",
        webgl_vendor: "Intel Open Source Technology Center",
        webgl_renderer: "Mesa DRI Intel(R) UHD Graphics 620 (KBL GT2)",
    },
];

/// Pick a profile for one browser session.
pub fn pick_profile() -> &'static FingerprintProfile {
    &FINGERPRINT_PROFILES[random::index(FINGERPRINT_PROFILES.len())]
}

/// Languages advertised through `navigator.languages`, derived from an
/// `Accept-Language` value ("uk-UA,uk;q=0.9" -> ["uk-UA", "uk"]).
pub fn languages_from_accept(accept_language: &str) -> Vec<String> {
    let languages: Vec<String> = accept_language
        .split(',')
        .filter_map(|part| part.split(';').next())
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty() && tag != "*")
        .collect();
    if languages.is_empty() {
        vec!["en-US".to_string(), "en".to_string()]
    } else {
        languages
    }
}

/// Scripts evaluated on every new document before page scripts run.
pub fn stealth_scripts(profile: &FingerprintProfile, languages: &[String]) -> Vec<String> {
    let languages_json = serde_json::to_string(languages).unwrap_or_else(|_| "[\"en-US\"]".into());
    let platform_json = js_string(profile.platform);
    let vendor_json = js_string(profile.webgl_vendor);
    let renderer_json = js_string(profile.webgl_renderer);

    vec![
        // Remove webdriver property
        r#"
        Object.defineProperty(navigator, 'webdriver', {
            get: () => undefined,
            configurable: true
        });
        "#
        .to_string(),
        // Fix chrome object
        r#"
        window.chrome = {
            runtime: {},
            loadTimes: function() {},
            csi: function() {},
            app: {}
        };
        "#
        .to_string(),
        // Fix permissions
        r#"
        const originalQuery = window.navigator.permissions.query;
        window.navigator.permissions.query = (parameters) => (
            parameters.name === 'notifications' ?
            Promise.resolve({ state: Notification.permission }) :
            originalQuery(parameters)
        );
        "#
        .to_string(),
        // Fix plugins (make it look like regular Chrome)
        r#"
        Object.defineProperty(navigator, 'plugins', {
            get: () => [
                { name: 'Chrome PDF Plugin', filename: 'internal-pdf-viewer', description: 'Portable Document Format' },
                { name: 'Chrome PDF Viewer', filename: 'mhjfbmdgcfjbbpaeojofohoefgiehjai', description: '' },
                { name: 'Native Client', filename: 'internal-nacl-plugin', description: '' }
            ],
            configurable: true
        });
        "#
        .to_string(),
        format!(
            r#"
        Object.defineProperty(navigator, 'languages', {{
            get: () => {languages_json},
            configurable: true
        }});
        "#
        ),
        format!(
            r#"
        Object.defineProperty(navigator, 'platform', {{
            get: () => {platform_json},
            configurable: true
        }});
        "#
        ),
        // Remove automation-related properties
        r#"
        delete window.cdc_adoQpoasnfa76pfcZLmcfl_Array;
        delete window.cdc_adoQpoasnfa76pfcZLmcfl_Promise;
        delete window.cdc_adoQpoasnfa76pfcZLmcfl_Symbol;
        "#
        .to_string(),
        // UNMASKED_VENDOR_WEBGL / UNMASKED_RENDERER_WEBGL
        format!(
            r#"
        const getParameter = WebGLRenderingContext.prototype.getParameter;
        WebGLRenderingContext.prototype.getParameter = function(parameter) {{
            if (parameter === 37445) {{
                return {vendor_json};
            }}
            if (parameter === 37446) {{
                return {renderer_json};
            }}
            return getParameter.call(this, parameter);
        }};
        "#
        ),
    ]
}

fn js_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

/// Chrome flags that hide automation markers.
pub const STEALTH_ARGS: &[&str] = &[
    "--disable-blink-features=AutomationControlled",
    "--disable-infobars",
    "--disable-dev-shm-usage",
    "--no-first-run",
    "--no-default-browser-check",
    "--disable-background-networking",
    "--disable-sync",
    "--disable-translate",
    "--metrics-recording-only",
    "--safebrowsing-disable-auto-update",
    "--no-sandbox", // Often needed for headless in containers/restricted environments
    "--disable-gpu",
    "--disable-software-rasterizer",
    "--window-size=1366,768",
];
