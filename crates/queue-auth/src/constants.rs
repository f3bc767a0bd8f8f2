//! NeuVue queue authentication constants
//!
//! The Auth0 values identify the public client application used by the
//! browser login page. They are not secrets; the access/refresh tokens
//! are managed by the token store.

/// Path (relative to the queue base URL) of the token endpoint used for
/// both authorization-code exchange and refresh.
pub const TOKEN_PATH: &str = "/auth/tokens";

/// Environment variable supplying the access token.
pub const ACCESS_TOKEN_ENV: &str = "NEUVUEQUEUE_ACCESS_TOKEN";

/// Environment variable supplying the refresh token.
pub const REFRESH_TOKEN_ENV: &str = "NEUVUEQUEUE_REFRESH_TOKEN";

/// Directory under the user's home holding the credential file.
pub const CREDENTIALS_DIR: &str = ".neuvuequeue";

/// Credential file name inside `CREDENTIALS_DIR`.
pub const CREDENTIALS_FILE: &str = "neuvuequeue.cfg";

/// Auth0 authorization endpoint for the interactive login.
pub const AUTHORIZE_ENDPOINT: &str = "https://dev-oe-jgl7m.us.auth0.com/authorize";

/// Auth0 public client ID of the NeuVue web app.
pub const CLIENT_ID: &str = "BdwlItpSZeMrd2ZJwaVrmn0VILYhmriK";

/// Page that displays the authorization code for the user to paste back.
pub const REDIRECT_URI: &str = "https://app.neuvue.io/token";

/// `offline_access` is what makes Auth0 issue a refresh token.
pub const SCOPES: &str = "openid profile email offline_access";

/// API audience the issued tokens are valid for.
pub const AUDIENCE: &str = "https://queue.neuvue.io";
