use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The signed-in identity. This is a stub holder, not real authentication:
/// sign-in mints a demo identity for the chosen provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Supported stub sign-in providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Google,
    Apple,
}

impl Identity {
    /// Mints the demo identity for a provider, mirroring a social login
    /// without any credential exchange.
    pub fn demo(provider: Provider) -> Self {
        let (name, email, seed) = match provider {
            Provider::Google => ("Google Demo User", "google_user@example.com", "google"),
            Provider::Apple => ("Apple Demo User", "apple_user@example.com", "apple"),
        };
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            avatar: Some(format!(
                "https://api.dicebear.com/7.x/avataaars/svg?seed={seed}"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_deserializes_lowercase() {
        let p: Provider = serde_json::from_str(r#""google""#).unwrap();
        assert_eq!(p, Provider::Google);
        let p: Provider = serde_json::from_str(r#""apple""#).unwrap();
        assert_eq!(p, Provider::Apple);
    }

    #[test]
    fn test_demo_identity_has_avatar() {
        let identity = Identity::demo(Provider::Google);
        assert!(identity.avatar.unwrap().contains("seed=google"));
        assert!(identity.email.contains("google"));
    }
}
