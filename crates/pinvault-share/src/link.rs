//! Decrypt links: `<base>/decrypt?cid=<cid>&gateway=<enc>&name=<enc>`
//!
//! A link never carries the password; it travels over a separate channel.

use std::borrow::Cow;

use pinvault_core::config::DEFAULT_PUBLIC_GATEWAY;

use crate::error::{ShareError, ShareResult};

/// Route of the decrypt page under the share base URL
pub const DECRYPT_PATH: &str = "/decrypt";

/// Filename used when a link names none
pub const DEFAULT_FILENAME: &str = "decrypted-file";

/// A link to an encrypted upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareLink {
    pub cid: String,
    pub gateway: String,
    pub name: String,
}

impl ShareLink {
    pub fn new(
        cid: impl Into<String>,
        gateway: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            cid: cid.into(),
            gateway: gateway.into(),
            name: name.into(),
        }
    }

    /// Render against the origin serving the decrypt page.
    pub fn to_url(&self, base_url: &str) -> String {
        format!(
            "{}{DECRYPT_PATH}?cid={}&gateway={}&name={}",
            base_url.trim_end_matches('/'),
            urlencoding::encode(&self.cid),
            urlencoding::encode(&self.gateway),
            urlencoding::encode(&self.name),
        )
    }
}

/// Parameters read back from a link. The CID may be missing; the workflow
/// refuses to run until it is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkParams {
    pub cid: Option<String>,
    pub gateway: String,
    pub name: String,
}

impl LinkParams {
    /// Parse a full link or a bare query string.
    pub fn parse(link: &str) -> ShareResult<Self> {
        Self::parse_with_default_gateway(link, DEFAULT_PUBLIC_GATEWAY)
    }

    /// Parse, filling a missing `gateway` with `default_gateway`.
    ///
    /// Empty parameters count as absent. Unknown parameters are ignored and
    /// the first occurrence of a repeated one wins.
    pub fn parse_with_default_gateway(link: &str, default_gateway: &str) -> ShareResult<Self> {
        let query = match link.split_once('?') {
            Some((_, q)) => q,
            None if link.contains('=') => link,
            None => "",
        };
        let query = query.split('#').next().unwrap_or_default();

        let mut cid = None;
        let mut gateway = None;
        let mut name = None;

        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let slot = match &*decode(key)? {
                "cid" => &mut cid,
                "gateway" => &mut gateway,
                "name" => &mut name,
                _ => continue,
            };
            if slot.is_none() {
                let value = decode(value)?;
                if !value.is_empty() {
                    *slot = Some(value.into_owned());
                }
            }
        }

        Ok(Self {
            cid,
            gateway: gateway.unwrap_or_else(|| default_gateway.to_string()),
            name: name.unwrap_or_else(|| DEFAULT_FILENAME.to_string()),
        })
    }
}

/// Query-component decoding: `+` is a space, then percent-decoding.
fn decode(raw: &str) -> ShareResult<Cow<'_, str>> {
    let decoded = if raw.contains('+') {
        Cow::Owned(
            urlencoding::decode(&raw.replace('+', " "))
                .map_err(|e| ShareError::InvalidLink(e.to_string()))?
                .into_owned(),
        )
    } else {
        urlencoding::decode(raw).map_err(|e| ShareError::InvalidLink(e.to_string()))?
    };
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_to_url_encodes_gateway_and_name() {
        let link = ShareLink::new(
            "bafyabc",
            "https://ipfs.io/ipfs/",
            "my report (final).pdf",
        );
        assert_eq!(
            link.to_url("https://vault.example.com/"),
            "https://vault.example.com/decrypt?cid=bafyabc\
             &gateway=https%3A%2F%2Fipfs.io%2Fipfs%2F\
             &name=my%20report%20%28final%29.pdf"
        );
    }

    #[test]
    fn test_parse_defaults() {
        let params =
            LinkParams::parse("https://vault.example.com/decrypt?cid=X&name=photo.png").unwrap();
        assert_eq!(params.cid.as_deref(), Some("X"));
        assert_eq!(params.gateway, "https://ipfs.io/ipfs/");
        assert_eq!(params.name, "photo.png");

        let params = LinkParams::parse("cid=X").unwrap();
        assert_eq!(params.name, DEFAULT_FILENAME);
    }

    #[test]
    fn test_parse_missing_or_empty_cid() {
        assert_eq!(LinkParams::parse("https://vault.example.com/decrypt").unwrap().cid, None);
        assert_eq!(LinkParams::parse("/decrypt?cid=&name=a.txt").unwrap().cid, None);
    }

    #[test]
    fn test_parse_decodes_plus_and_percent() {
        let params = LinkParams::parse(
            "?cid=X&name=holiday+snaps%21.jpg&gateway=http%3A%2F%2Flocalhost%3A8080%2Fipfs",
        )
        .unwrap();
        assert_eq!(params.name, "holiday snaps!.jpg");
        assert_eq!(params.gateway, "http://localhost:8080/ipfs");
    }

    #[test]
    fn test_parse_ignores_fragment_and_unknown_params() {
        let params = LinkParams::parse("/decrypt?utm=x&cid=Qm1&cid=Qm2#top").unwrap();
        assert_eq!(params.cid.as_deref(), Some("Qm1"));
    }

    #[test]
    fn test_parse_invalid_utf8_is_error() {
        assert!(matches!(
            LinkParams::parse("?cid=%FF%FE"),
            Err(ShareError::InvalidLink(_))
        ));
    }

    proptest! {
        #[test]
        fn link_params_survive_rendering(
            cid in "[a-zA-Z0-9]{1,59}",
            name in "[^\u{0}]{1,40}",
            host in "[a-z]{1,12}",
        ) {
            let gateway = format!("https://{host}.example/ipfs/");
            let url = ShareLink::new(cid.clone(), gateway.clone(), name.clone())
                .to_url("https://vault.example.com");
            let params = LinkParams::parse(&url).unwrap();
            prop_assert_eq!(params.cid, Some(cid));
            prop_assert_eq!(params.gateway, gateway);
            prop_assert_eq!(params.name, name);
        }
    }
}
