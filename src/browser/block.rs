//! Detection of defense-challenge and access-denied pages.

use super::FetchError;

/// Lowercased markers that only appear on challenge or denial pages.
const BLOCK_MARKERS: &[(&str, &str)] = &[
    ("access denied", "access denied"),
    ("attention required", "challenge page"),
    ("cf-challenge", "challenge page"),
    // Interstitial only; the challenge-platform script also rides on ordinary pages
    ("cf-chl-", "challenge page"),
    ("cf_chl_opt", "challenge page"),
    ("<title>just a moment...</title>", "challenge page"),
    ("/_____tmd_____/punish", "slider captcha"),
    ("x5secdata", "slider captcha"),
    ("slide to verify", "slider captcha"),
    ("unusual traffic", "unusual traffic notice"),
    ("비정상적인 접근", "unusual traffic notice"),
];

/// Why a rendered page looks like a block, if it does.
pub fn detect_block(html: &str) -> Option<&'static str> {
    if html.trim().is_empty() {
        return Some("empty response");
    }
    let lower = html.to_lowercase();
    BLOCK_MARKERS
        .iter()
        .find(|(marker, _)| lower.contains(marker))
        .map(|(_, reason)| *reason)
}

/// Main-document HTTP status check; error statuses count as a block.
pub fn check_status(url: &str, status: i64) -> Result<(), FetchError> {
    if status >= 400 {
        return Err(FetchError::blocked(url, format!("HTTP {}", status)));
    }
    Ok(())
}
