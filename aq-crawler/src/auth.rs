use aq_crypto::Cipher;
use chromiumoxide::Page;

use crate::config::AuthConfig;
use crate::error::{Error, Result};

/// A ready-to-replay snapshot of whatever the authenticated session
/// produced: cookies (as `name=value; Domain=...` strings CDP can set
/// directly on a new page) and extra headers to send on every request.
#[derive(Debug, Clone, Default)]
pub struct AuthSession {
    pub cookies: Vec<String>,
    pub headers: Vec<(String, String)>,
}

/// Runs the one-shot authenticated session described by `config` against a
/// fresh page, returning whatever needs to be replayed into every worker's
/// browser context. Cipher decrypts each stored credential field
/// immediately before use; nothing decrypted is logged.
#[tracing::instrument(skip(page, cipher, config))]
pub async fn establish(page: &Page, cipher: &Cipher, config: &AuthConfig) -> Result<AuthSession> {
    match config {
        AuthConfig::CredentialForm {
            login_url,
            username_selector,
            password_selector,
            submit_selector,
            encrypted_username,
            encrypted_password,
            success_url_prefix,
            success_selector,
        } => {
            let username = cipher.decrypt_from_str(encrypted_username)?;
            let password = cipher.decrypt_from_str(encrypted_password)?;

            page.goto(login_url).await.map_err(|e| Error::Auth(format!("navigating to login page: {e}")))?;
            page.wait_for_navigation().await.map_err(|e| Error::Auth(format!("waiting for login page: {e}")))?;

            fill(page, username_selector, &username).await?;
            fill(page, password_selector, &password).await?;
            click(page, submit_selector).await?;
            page.wait_for_navigation().await.map_err(|e| Error::Auth(format!("waiting post-login navigation: {e}")))?;

            if let Some(prefix) = success_url_prefix {
                let url = page.url().await.map_err(|e| Error::Auth(e.to_string()))?.unwrap_or_default();
                if !url.starts_with(prefix.as_str()) {
                    return Err(Error::Auth(format!("post-login URL {url} does not start with expected prefix {prefix}")));
                }
            }
            if let Some(selector) = success_selector {
                page.find_element(selector).await.map_err(|e| Error::Auth(format!("success selector {selector} not found: {e}")))?;
            }

            let raw = page.evaluate("document.cookie").await.map_err(|e| Error::Auth(e.to_string()))?;
            let raw_cookie_string: String = raw.into_value().unwrap_or_default();
            let cookies = raw_cookie_string.split(';').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect();
            Ok(AuthSession { cookies, headers: Vec::new() })
        }
        AuthConfig::Cookie { name, encrypted_value, domain } => {
            let value = cipher.decrypt_from_str(encrypted_value)?;
            Ok(AuthSession { cookies: vec![format!("{name}={value}; Domain={domain}")], headers: Vec::new() })
        }
        AuthConfig::Header { name, encrypted_value } => {
            let value = cipher.decrypt_from_str(encrypted_value)?;
            Ok(AuthSession { cookies: Vec::new(), headers: vec![(name.clone(), value)] })
        }
        AuthConfig::Basic { encrypted_username, encrypted_password } => {
            let username = cipher.decrypt_from_str(encrypted_username)?;
            let password = cipher.decrypt_from_str(encrypted_password)?;
            let encoded = base64_basic(&username, &password);
            Ok(AuthSession { cookies: Vec::new(), headers: vec![("Authorization".to_string(), format!("Basic {encoded}"))] })
        }
    }
}

async fn fill(page: &Page, selector: &str, value: &str) -> Result<()> {
    let element = page.find_element(selector).await.map_err(|e| Error::Auth(format!("selector {selector} not found: {e}")))?;
    element.click().await.map_err(|e| Error::Auth(e.to_string()))?;
    element.type_str(value).await.map_err(|e| Error::Auth(e.to_string()))?;
    Ok(())
}

async fn click(page: &Page, selector: &str) -> Result<()> {
    let element = page.find_element(selector).await.map_err(|e| Error::Auth(format!("selector {selector} not found: {e}")))?;
    element.click().await.map_err(|e| Error::Auth(e.to_string()))?;
    Ok(())
}

fn base64_basic(username: &str, password: &str) -> String {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD.encode(format!("{username}:{password}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_auth_header_is_well_formed_base64() {
        let encoded = base64_basic("alice", "secret");
        use base64::Engine;
        let decoded = base64::engine::general_purpose::STANDARD.decode(encoded).unwrap();
        assert_eq!(decoded, b"alice:secret");
    }
}
