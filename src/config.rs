use anyhow::{bail, Context};
use jsonwebtoken::Algorithm;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub algorithm: Algorithm,
    pub ttl_days: i64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub lichess_base_url: String,
}

impl AppConfig {
    /// Reads configuration from the environment once at startup. Missing
    /// signing material is fatal here, never a lazy failure on the first
    /// token operation.
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

        let secret = std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
        let algorithm: Algorithm = std::env::var("JWT_ALGORITHM")
            .context("JWT_ALGORITHM must be set")?
            .parse()
            .map_err(|_| anyhow::anyhow!("JWT_ALGORITHM is not a known JWT algorithm"))?;
        // Keys are derived from a shared secret, so only the HMAC family works.
        if !matches!(
            algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            bail!("JWT_ALGORITHM must be an HMAC algorithm (HS256, HS384 or HS512)");
        }
        let ttl_days = std::env::var("JWT_TTL_DAYS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(80);

        let lichess_base_url =
            std::env::var("LICHESS_BASE_URL").unwrap_or_else(|_| "https://lichess.org".into());

        Ok(Self {
            database_url,
            jwt: JwtConfig {
                secret,
                algorithm,
                ttl_days,
            },
            lichess_base_url,
        })
    }
}
