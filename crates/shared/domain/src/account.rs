use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

bitflags! {
    /// Extra player data requested alongside a login.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct InfoRequest: u32 {
        const PROFILE = 1 << 0;
        const ACCOUNT_INFO = 1 << 1;
        const USER_DATA = 1 << 2;
        const READ_ONLY_DATA = 1 << 3;

        const ALL = Self::PROFILE.bits()
            | Self::ACCOUNT_INFO.bits()
            | Self::USER_DATA.bits()
            | Self::READ_ONLY_DATA.bits();
    }
}

impl Default for InfoRequest {
    fn default() -> Self {
        Self::ALL
    }
}

impl From<u32> for InfoRequest {
    fn from(bits: u32) -> Self {
        Self::from_bits_truncate(bits)
    }
}

impl Serialize for InfoRequest {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u32(self.bits())
    }
}

impl<'de> Deserialize<'de> for InfoRequest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = u32::deserialize(deserializer)?;
        Ok(Self::from_bits_retain(bits))
    }
}

/// Anonymous login keyed by a device-local id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub title_id: String,
    pub custom_id: String,
    pub create_account: bool,
    pub info: InfoRequest,
}

/// Session established by a successful login.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResult {
    pub player_id: String,
    pub session_ticket: String,
    pub newly_created: bool,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkGoogleRequest {
    pub server_auth_code: String,
    pub force_link: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkAppleRequest {
    pub identity_token: String,
    pub force_link: bool,
}

/// Adds email/password credentials to the current account.
///
/// The username is always the email address.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsernamePasswordRequest {
    pub email: String,
    pub password: String,
    pub username: String,
}

impl UsernamePasswordRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        let email = email.into();
        Self { username: email.clone(), email, password: password.into() }
    }
}

impl std::fmt::Debug for UsernamePasswordRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsernamePasswordRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("username", &self.username)
            .finish()
    }
}

/// External identity a player account can be linked to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    Google,
    Apple,
    EmailPassword,
}
