use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::config::{Config, GATEWAY_TIMEOUT_SECS, MIN_NEWS_BODY_CHARS, SEEN_RETENTION_SECS};
use crate::dispatch::{escape_html, Dispatcher};
use crate::state::SeenCache;

/// Polls the configured RSS feeds and posts new items to the channel.
///
/// Duplicate suppression is two-keyed: by item link and by cleaned title, so a
/// syndicated story does not repeat under a different URL. Both seen sets are
/// time-windowed with a 7-day retention horizon rather than growing without
/// bound or being trimmed by raw count.
pub struct NewsTask {
    client: reqwest::Client,
    sources: Vec<String>,
    seen_links: SeenCache,
    seen_titles: SeenCache,
}

impl NewsTask {
    pub fn new(cfg: &Config) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(GATEWAY_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            sources: cfg.rss_sources.clone(),
            seen_links: SeenCache::new(SEEN_RETENTION_SECS),
            seen_titles: SeenCache::new(SEEN_RETENTION_SECS),
        }
    }

    /// One news pass: fetch every feed, post unseen items oldest-first, prune
    /// the dedup caches. A failing feed is logged and skipped; it never stops
    /// the pass. Returns the number of items posted.
    pub async fn poll(&mut self, dispatcher: &Dispatcher, now: DateTime<Utc>) -> usize {
        self.seen_links.prune(now);
        self.seen_titles.prune(now);

        let mut posted = 0;
        for url in self.sources.clone() {
            let channel = match self.fetch_channel(&url).await {
                Ok(c) => c,
                Err(e) => {
                    warn!("RSS fetch failed for {url}: {e}");
                    continue;
                }
            };
            let source = channel.title().to_string();

            // Oldest first, so the channel reads chronologically.
            for item in channel.items().iter().rev() {
                if let Some(caption) = self.consider_item(item, &source, now) {
                    match item_image(item) {
                        Some(img) => dispatcher.send_photo(&caption, &img).await,
                        None => dispatcher.send_text(&caption).await,
                    }
                    posted += 1;
                }
            }
        }

        if posted == 0 {
            debug!("no new RSS items this pass");
        }
        posted
    }

    /// Dedup and quality checks for one feed item. Returns the rendered
    /// caption if the item should be posted, recording it as seen.
    fn consider_item(&mut self, item: &rss::Item, source: &str, now: DateTime<Utc>) -> Option<String> {
        let link = item.link()?.to_string();
        if self.seen_links.contains(&link) {
            return None;
        }

        let title = clean_html(item.title().unwrap_or_default());
        if title.is_empty() || self.seen_titles.contains(&title) {
            return None;
        }

        let body = clean_html(item.description().unwrap_or_default());
        if body.len() < MIN_NEWS_BODY_CHARS {
            return None;
        }

        self.seen_links.insert(&link, now);
        self.seen_titles.insert(&title, now);

        Some(format!(
            "⚽ <b>{}</b>\n\n{}\n\n📰 <i>{}</i>",
            escape_html(&title),
            escape_html(&body),
            escape_html(source),
        ))
    }

    async fn fetch_channel(&self, url: &str) -> crate::error::Result<rss::Channel> {
        let bytes = self.client.get(url).send().await?.bytes().await?;
        Ok(rss::Channel::read_from(&bytes[..])?)
    }
}

/// Extracts an image URL from an item's enclosure or media extensions,
/// skipping video files.
pub fn item_image(item: &rss::Item) -> Option<String> {
    if let Some(enclosure) = item.enclosure() {
        if enclosure.mime_type().starts_with("image/") {
            return Some(enclosure.url().to_string());
        }
    }

    let media = item.extensions().get("media")?;
    for key in ["content", "thumbnail"] {
        if let Some(list) = media.get(key) {
            for ext in list {
                if let Some(url) = ext.attrs().get("url") {
                    if url.starts_with("http") && !url.ends_with(".mp4") {
                        return Some(url.clone());
                    }
                }
            }
        }
    }
    None
}

/// Strips tags, bare URLs, and entities from feed HTML, collapsing whitespace.
pub fn clean_html(raw: &str) -> String {
    let unescaped = unescape_entities(raw);

    let mut stripped = String::with_capacity(unescaped.len());
    let mut in_tag = false;
    for c in unescaped.chars() {
        match c {
            '<' => in_tag = true,
            '>' => {
                in_tag = false;
                stripped.push(' ');
            }
            _ if !in_tag => stripped.push(c),
            _ => {}
        }
    }

    stripped
        .split_whitespace()
        .filter(|word| !word.starts_with("http"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn unescape_entities(raw: &str) -> String {
    raw.replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_html_strips_tags_urls_and_entities() {
        let raw = "<p>Arsenal &amp; Chelsea <b>draw</b></p> https://example.com/x";
        assert_eq!(clean_html(raw), "Arsenal & Chelsea draw");
    }

    #[test]
    fn clean_html_collapses_whitespace() {
        assert_eq!(clean_html("a\n\n  b\t c"), "a b c");
        assert_eq!(clean_html(""), "");
    }

    #[test]
    fn enclosure_image_is_preferred() {
        let mut item = rss::Item::default();
        let mut enclosure = rss::Enclosure::default();
        enclosure.set_url("https://example.com/pic.jpg");
        enclosure.set_mime_type("image/jpeg");
        item.set_enclosure(enclosure);
        assert_eq!(item_image(&item).as_deref(), Some("https://example.com/pic.jpg"));
    }

    #[test]
    fn video_enclosure_is_ignored() {
        let mut item = rss::Item::default();
        let mut enclosure = rss::Enclosure::default();
        enclosure.set_url("https://example.com/clip.mp4");
        enclosure.set_mime_type("video/mp4");
        item.set_enclosure(enclosure);
        assert_eq!(item_image(&item), None);
    }
}
