//! Single attribute scrapers for GYAO! html pages.
//!
//! Both scrapers walk all start tags in document order and keep the value of the **last** tag
//! which matches, later tags overwrite earlier ones. Neither of them fails, if no tag matches an
//! empty string is returned.
//!
//! The html is only tokenized, no document tree is built. Tags are therefore seen exactly as
//! they appear in the source, including tags inside `<noscript>` or misplaced in tables. The
//! content of `<script>` and `<style>` is text. If an attribute appears more than once on a tag,
//! its last value counts.

use html5ever::tendril::StrTendril;
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
};
use regex::Regex;

/// Class the video player element of a GYAO! page carries.
pub const PLAYER_CLASS: &str = "gyao-player";

const DUPLICATE_ATTRIBUTE_ERROR: &str = "Duplicate attribute";

lazy_static::lazy_static! {
    static ref ENDPOINT_REGEX: Regex = Regex::new(r"^/api/programs/[0-9a-z-]+/videos$").unwrap();
    static ref ATTRIBUTE_REGEX: Regex =
        Regex::new(r#"([^\s/>=][^\s/>=]*)(?:\s*=\s*("[^"]*"|'[^']*'|[^\s>]*))?"#).unwrap();
}

/// A start tag with its attributes in source order.
#[derive(Clone, Debug, Default)]
struct StartTag {
    name: String,
    attributes: Vec<(String, String)>,
}

impl StartTag {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .rev()
            .find(|(attribute, _)| attribute == name)
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Default)]
struct StartTagSink {
    tags: Vec<StartTag>,
    duplicate_attribute: bool,
    /// Indices into `tags` whose duplicate attributes were dropped by the tokenizer.
    rescan: Vec<usize>,
}

impl TokenSink for StartTagSink {
    type Handle = ();

    fn process_token(&mut self, token: Token, _line_number: u64) -> TokenSinkResult<()> {
        match token {
            Token::ParseError(error) if error == DUPLICATE_ATTRIBUTE_ERROR => {
                self.duplicate_attribute = true
            }
            Token::TagToken(tag) if tag.kind == TagKind::StartTag => {
                if std::mem::take(&mut self.duplicate_attribute) {
                    self.rescan.push(self.tags.len())
                }
                let name = tag.name.to_string();
                self.tags.push(StartTag {
                    name: name.clone(),
                    attributes: tag
                        .attrs
                        .into_iter()
                        .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
                        .collect(),
                });

                match name.as_str() {
                    "script" => return TokenSinkResult::RawData(RawKind::ScriptData),
                    "style" => return TokenSinkResult::RawData(RawKind::Rawtext),
                    _ => (),
                }
            }
            Token::TagToken(_) => self.duplicate_attribute = false,
            _ => (),
        }
        TokenSinkResult::Continue
    }
}

impl StartTagSink {
    /// Read the attributes of the pending tags again from `consumed`, the html up to and including
    /// the `>` which closed them, keeping every occurrence.
    fn rescan_duplicates(&mut self, consumed: &str) {
        let lowercase = consumed.to_ascii_lowercase();

        for index in std::mem::take(&mut self.rescan) {
            let tag = &mut self.tags[index];
            let Some(start) = lowercase.rfind(&format!("<{}", tag.name)) else {
                continue;
            };
            let raw = consumed[start + 1 + tag.name.len()..].trim_end_matches('>');

            tag.attributes = ATTRIBUTE_REGEX
                .captures_iter(raw)
                .map(|capture| {
                    let value = capture.get(2).map_or("", |value| value.as_str());
                    let value = value
                        .strip_prefix('"')
                        .and_then(|v| v.strip_suffix('"'))
                        .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                        .unwrap_or(value);
                    (capture[1].to_ascii_lowercase(), value.to_string())
                })
                .collect();
        }
    }
}

/// All start tags of `html` in document order.
fn start_tags(html: &str) -> Vec<StartTag> {
    let mut tokenizer = Tokenizer::new(StartTagSink::default(), TokenizerOpts::default());
    let mut input = BufferQueue::default();

    // every chunk ends with the `>` of a potential tag, a tag emitted while feeding a chunk
    // ends exactly at its end
    let mut consumed = 0;
    for chunk in html.split_inclusive('>') {
        consumed += chunk.len();
        input.push_back(StrTendril::from_slice(chunk));
        let _ = tokenizer.feed(&mut input);
        if !tokenizer.sink.rescan.is_empty() {
            tokenizer.sink.rescan_duplicates(&html[..consumed]);
        }
    }
    tokenizer.end();

    tokenizer.sink.tags
}

/// Extract the GYAO! video id (`data-vid` attribute) of the player element in `html`.
///
/// A tag matches if its `class` attribute contains [`PLAYER_CLASS`]. A matching tag without a
/// `data-vid` attribute resets the result to an empty string.
pub fn extract_video_id<S: AsRef<str>>(html: S) -> String {
    start_tags(html.as_ref())
        .iter()
        .filter(|tag| tag.attr("class").is_some_and(|class| class.contains(PLAYER_CLASS)))
        .fold(String::new(), |_, tag| {
            tag.attr("data-vid").unwrap_or_default().to_string()
        })
}

/// Extract the path of the series api (`data-endpoint-url` attribute) from `html`. Only values
/// shaped like `/api/programs/<id>/videos` are accepted.
pub fn extract_series_endpoint<S: AsRef<str>>(html: S) -> String {
    start_tags(html.as_ref())
        .iter()
        .filter_map(|tag| tag.attr("data-endpoint-url"))
        .filter(|endpoint| ENDPOINT_REGEX.is_match(endpoint))
        .fold(String::new(), |_, endpoint| endpoint.to_string())
}
