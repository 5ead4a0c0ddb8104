use url::Url;

/// Sites that commonly block automated extraction.
pub const PAYWALL_DOMAINS: &[&str] = &[
    "wsj.com",
    "ft.com",
    "economist.com",
    "telegraph.co.uk",
    "thetimes.co.uk",
    "hbr.org",
    "theatlantic.com",
    "foreignaffairs.com",
    "seekingalpha.com",
    "barrons.com",
    "investors.com",
    "nytimes.com",
    "washingtonpost.com",
    "bloomberg.com",
    "businessinsider.com",
    "wired.com",
];

/// Host of `url`, lowercased and without a leading `www.`.
pub fn normalized_host(url: &str) -> Option<String> {
    let host = Url::parse(url).ok()?.host_str()?.to_lowercase();
    Some(host.strip_prefix("www.").map(str::to_string).unwrap_or(host))
}

/// Matches the listed domains and their subdomains only, so `microsoft.com`
/// is not mistaken for `ft.com`.
pub fn is_likely_paywalled(url: &str) -> bool {
    normalized_host(url)
        .map(|host| {
            PAYWALL_DOMAINS
                .iter()
                .any(|domain| host == *domain || host.ends_with(&format!(".{}", domain)))
        })
        .unwrap_or(false)
}

/// Guidance shown when neither extraction strategy produced text.
pub fn failure_guidance(paywalled: bool) -> String {
    let mut message = String::from("Unable to extract article content from this URL. ");
    if paywalled {
        message.push_str(
            "This site often has paywalled content. Please copy and paste the article text manually if you have access.",
        );
    } else {
        message.push_str(
            "The page might be behind a paywall, use dynamic content loading, or have an unusual structure. Please copy and paste the article text manually.",
        );
    }
    message
}
