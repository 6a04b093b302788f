//! Photo references in agent messages
//!
//! The agent marks images as `<photo>PHOTO_REFERENCE</photo>`. Before a
//! message is shown, each tag becomes a markdown image pointing at the
//! relay's photo endpoint, authorized with the shared token.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::error::{ArrivaError, Result};

fn photo_tag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<photo>(.*?)</photo>").expect("photo tag pattern is valid"))
}

/// Builds authorized photo URLs against a relay base URL
#[derive(Debug, Clone)]
pub struct PhotoLinker {
    endpoint: reqwest::Url,
    token: Option<String>,
}

impl PhotoLinker {
    /// `relay_base` is the relay root, e.g. `http://127.0.0.1:5001`
    pub fn new(relay_base: &str, token: Option<String>) -> Result<Self> {
        let raw = format!("{}/place-photo", relay_base.trim_end_matches('/'));
        let endpoint = reqwest::Url::parse(&raw)
            .map_err(|e| ArrivaError::Config(format!("Invalid relay URL {raw}: {e}")))?;
        Ok(Self { endpoint, token })
    }

    /// Relay URL streaming the photo for `photo_reference`
    pub fn photo_url(&self, photo_reference: &str) -> String {
        let mut url = self.endpoint.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("photo_reference", photo_reference);
            if let Some(token) = &self.token {
                query.append_pair("token", token);
            }
        }
        url.into()
    }

    /// Replace every `<photo>REF</photo>` tag with `![photo](URL)`
    pub fn rewrite(&self, markdown: &str) -> String {
        photo_tag()
            .replace_all(markdown, |caps: &Captures<'_>| {
                format!("![photo]({})", self.photo_url(caps[1].trim()))
            })
            .into_owned()
    }
}
