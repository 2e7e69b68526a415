//! Human-readable Kalshi market URLs.
//!
//! The site URL for an event is
//! `https://kalshi.com/markets/{series}/{series-title-slug}/{event}`,
//! where the series ticker is the event ticker minus its trailing
//! numeric suffix.

/// Series ticker for an event: strip one trailing `-NN` numeric
/// segment, if present.
pub fn series_ticker(event_ticker: &str) -> &str {
    match event_ticker.rsplit_once('-') {
        Some((head, tail)) if !tail.is_empty() && tail.bytes().all(|b| b.is_ascii_digit()) => {
            head
        }
        _ => event_ticker,
    }
}

/// Convert a series title to a URL slug: lowercase, drop everything but
/// letters, digits, spaces, and dashes, then dash-join the words.
pub fn slugify(title: &str) -> String {
    let cleaned: String = title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == ' ' || *c == '-')
        .collect();

    let mut slug = String::with_capacity(cleaned.len());
    for word in cleaned.split([' ', '-']).filter(|w| !w.is_empty()) {
        if !slug.is_empty() {
            slug.push('-');
        }
        slug.push_str(word);
    }
    slug
}

/// Full market URL for an event.
pub fn market_url(series_ticker: &str, slug: &str, event_ticker: &str) -> String {
    format!(
        "https://kalshi.com/markets/{}/{}/{}",
        series_ticker.to_lowercase(),
        slug,
        event_ticker.to_lowercase()
    )
}
