use std::convert::TryInto;
use std::path::PathBuf;
use std::{env, fs};

const PASSWORD_SALT: &str = "password.salt";
const USER_AUTH_SECRET: &str = "user_auth.secret";

pub type Salt = [u8; 16];

/// Security material shared by the credential verifier and the JWT layer:
/// a store-wide bcrypt salt and an HS256 signing secret.
#[derive(Debug, Clone)]
pub struct Security {
    pub salt: Salt,
    pub jwt_secret: Vec<u8>,
}

#[inline]
fn security_dir() -> PathBuf {
    PathBuf::from(env::var("SECURITY_DIR").unwrap_or("./security".to_string()))
}

impl Security {
    pub fn load() -> Security {
        let dir = security_dir();

        if cfg!(feature = "generate-security") {
            fs::create_dir_all(dir.clone())
                .expect("unable to create directory for storing security information");
        }

        tracing::info!("Loading password salt...");
        let mut salt: Option<Salt> = fs::read(dir.join(PASSWORD_SALT))
            .map(|s| s.try_into().ok())
            .ok()
            .flatten();

        match salt {
            None => {
                tracing::info!("Salt not found in '{}'.", dir.join(PASSWORD_SALT).display());
                if cfg!(feature = "generate-security") {
                    tracing::info!("Generating a new password salt.");
                    salt = Some(rand::random());

                    fs::write(dir.join(PASSWORD_SALT), salt.unwrap())
                        .expect("unable to write salt");
                } else {
                    panic!("unable to load password salt");
                }
            }
            Some(_) => tracing::info!("Salt found and loaded."),
        }

        tracing::info!("Loading JWT signing secret...");
        let jwt_secret = match fs::read(dir.join(USER_AUTH_SECRET)) {
            Ok(secret) if !secret.is_empty() => {
                tracing::info!("Loaded JWT secret.");
                secret
            }
            _ => {
                if !cfg!(feature = "generate-security") {
                    panic!("unable to load the user auth signing secret");
                }

                tracing::info!("Unable to load the user auth secret. Generating a new one.");
                let secret: Vec<u8> = (0..64).map(|_| rand::random::<u8>()).collect();

                fs::write(dir.join(USER_AUTH_SECRET), secret.as_slice())
                    .expect("unable to write user auth secret");

                tracing::info!("Done generating the JWT secret.");
                secret
            }
        };

        Security {
            salt: salt.unwrap(),
            jwt_secret,
        }
    }
}
