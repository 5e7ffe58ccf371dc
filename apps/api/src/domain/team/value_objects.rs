use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Display name of a team
///
/// # Invariants
/// - Surrounding whitespace is trimmed
/// - Between 2 and 64 characters after trimming
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamName(String);

impl TeamName {
    const MIN_LENGTH: usize = 2;
    const MAX_LENGTH: usize = 64;

    /// Creates a new TeamName value object
    ///
    /// # Example
    /// ```
    /// use turfhub_api::domain::team::TeamName;
    ///
    /// let name = TeamName::new("  Ink Storm ").expect("valid name");
    /// assert_eq!(name.as_str(), "Ink Storm");
    /// ```
    pub fn new(name: impl AsRef<str>) -> Result<Self, String> {
        let name = name.as_ref().trim();
        let length = name.chars().count();

        if length < Self::MIN_LENGTH || length > Self::MAX_LENGTH {
            return Err(format!(
                "Team name must be between {} and {} characters",
                Self::MIN_LENGTH,
                Self::MAX_LENGTH
            ));
        }

        Ok(TeamName(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for TeamName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// URL slug identifying a team, derived from its name
///
/// # Invariants
/// - Lowercase ASCII alphanumerics separated by single `-`
/// - Never empty, never starts or ends with `-`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomUrl(String);

impl CustomUrl {
    /// Derives the slug of a team name
    ///
    /// # Example
    /// ```
    /// use turfhub_api::domain::team::CustomUrl;
    ///
    /// let url = CustomUrl::from_name("Team  Olive!!").expect("valid slug");
    /// assert_eq!(url.as_str(), "team-olive");
    /// ```
    pub fn from_name(name: &str) -> Result<Self, String> {
        let mut slug = String::with_capacity(name.len());
        let mut pending_dash = false;

        for c in name.chars() {
            if c.is_ascii_alphanumeric() {
                if pending_dash && !slug.is_empty() {
                    slug.push('-');
                }
                pending_dash = false;
                slug.push(c.to_ascii_lowercase());
            } else {
                pending_dash = true;
            }
        }

        if slug.is_empty() {
            return Err(format!("Team name '{}' produces an empty URL", name));
        }

        Ok(CustomUrl(slug))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CustomUrl {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Code that lets a user join a team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InviteCode(String);

impl InviteCode {
    const LENGTH: usize = 10;
    const ALPHABET: &'static [u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    /// Generates a fresh random invite code
    ///
    /// The code is the base-36 form (`[0-9a-z]`) of a v4 UUID's random bits,
    /// truncated to 10 characters.
    pub fn generate() -> Self {
        let base = Self::ALPHABET.len() as u128;
        let mut bits = Uuid::new_v4().as_u128();
        let mut code = String::with_capacity(Self::LENGTH);
        for _ in 0..Self::LENGTH {
            code.push(char::from(Self::ALPHABET[(bits % base) as usize]));
            bits /= base;
        }

        InviteCode(code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Free-form role a member picked for themselves on a team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct MemberRole(String);

impl MemberRole {
    /// Blank roles are stored as no role at all
    pub fn new(role: impl AsRef<str>) -> Option<Self> {
        let role = role.as_ref().trim();
        (!role.is_empty()).then(|| MemberRole(role.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Which of a team's images an operation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamImageType {
    Avatar,
    Banner,
}

impl TeamImageType {
    /// Column on the team row referencing the image
    pub fn column(&self) -> &'static str {
        match self {
            TeamImageType::Avatar => "avatarImgId",
            TeamImageType::Banner => "bannerImgId",
        }
    }
}

impl std::str::FromStr for TeamImageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "avatar" => Ok(TeamImageType::Avatar),
            "banner" => Ok(TeamImageType::Banner),
            other => Err(format!("Unknown image type: {}", other)),
        }
    }
}
