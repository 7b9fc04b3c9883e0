//! Cached identity of the logged-in user.
//!
//! The avatar color is a pure function of the seed string and must stay
//! bit-for-bit stable: stored profiles and rendered avatars depend on the
//! exact hue it produces.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use url::Url;

/// Bytes left unescaped in the avatar seed: the URI component set
/// (`A-Z a-z 0-9 - _ . ! ~ * ' ( )`).
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Saturation used for every avatar color.
pub const AVATAR_SATURATION: u8 = 70;

/// Lightness used for every avatar color.
pub const AVATAR_LIGHTNESS: u8 = 55;

/// Profile cached for the active session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// CSS `hsl(...)` color derived from the name (or email).
    pub avatar_color: String,
    /// Optional avatar image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl UserProfile {
    /// Builds a profile, deriving the avatar color from `name`, or from
    /// `email` when `name` is empty.
    ///
    /// When `avatar_base` is given, the avatar URL is the base with the same
    /// seed appended as the `u` query parameter.
    #[must_use]
    pub fn new(name: &str, email: &str, avatar_base: Option<&Url>) -> Self {
        let seed = if name.is_empty() { email } else { name };
        let avatar_url = avatar_base.map(|base| avatar_url(base, seed));
        Self {
            name: name.to_string(),
            email: email.to_string(),
            avatar_color: avatar_color(seed),
            avatar_url,
        }
    }

    /// First letter of each space-separated word, at most two, uppercased.
    #[must_use]
    pub fn initials(&self) -> String {
        self.name
            .split(' ')
            .filter_map(|piece| piece.chars().next())
            .take(2)
            .flat_map(char::to_uppercase)
            .collect()
    }
}

/// `base` with `u=<seed>` appended to its query, the seed escaped as a URI
/// component (space becomes `%20`, not `+`).
fn avatar_url(base: &Url, seed: &str) -> String {
    let mut url = base.clone();
    url.set_fragment(None);
    if url.query() == Some("") {
        url.set_query(None);
    }
    let separator = if url.query().is_some() { '&' } else { '?' };
    format!(
        "{url}{separator}u={}",
        utf8_percent_encode(seed, URI_COMPONENT)
    )
}

/// Hue in `0..360` for the given seed.
///
/// Folds the UTF-16 code units of `seed` into a rolling hash
/// (`hash = unit + ((hash << 5) - hash)`), where the shift truncates to a
/// signed 32-bit integer before shifting but the running value does not.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn avatar_hue(seed: &str) -> u16 {
    let hash = seed.encode_utf16().fold(0i64, |hash, unit| {
        let shifted = i64::from((hash as i32).wrapping_shl(5));
        i64::from(unit).wrapping_add(shifted).wrapping_sub(hash)
    });
    // Safe: the remainder is below 360.
    (hash.unsigned_abs() % 360) as u16
}

/// CSS color string for the given seed, e.g. `hsl(38, 70%, 55%)`.
#[must_use]
pub fn avatar_color(seed: &str) -> String {
    format!(
        "hsl({}, {AVATAR_SATURATION}%, {AVATAR_LIGHTNESS}%)",
        avatar_hue(seed)
    )
}
