use rocket::form::Form;
use rocket::http::CookieJar;
use rocket::http::Status;
use rocket::State;

use crate::auth::authenticate;
use crate::data::user::User;
use crate::resp::jwt::UserRoleToken;
use crate::resp::problem::Problem;
use crate::security::Security;
use crate::store::FileStore;

#[derive(Clone, FromForm)]
pub struct UserLoginData {
    pub id: String,
    pub password: String,
}

impl std::fmt::Debug for UserLoginData {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "UserLoginData:{}", self.id)
    }
}

#[inline]
fn bad_login() -> Problem {
    Problem::new_untyped(Status::Unauthorized, "Bad user id or password.")
}

#[post("/login", data = "<login_user>")]
#[tracing::instrument(skip(cookies, store, security))]
pub async fn login_submit<'a>(
    login_user: Form<UserLoginData>,
    cookies: &'a CookieJar<'_>,
    store: &State<FileStore>,
    security: &State<Security>,
) -> Result<User, Problem> {
    if login_user.id.is_empty() || login_user.password.is_empty() {
        return Err(bad_login());
    }

    let user = authenticate(
        store.inner(),
        &security.salt,
        &login_user.id,
        &login_user.password,
    )
    .ok_or_else(bad_login)?;

    let urt = UserRoleToken::new(&user);
    cookies.add(urt.cookie(&security.jwt_secret)?);

    Ok(user)
}

///////////////////////
//       TESTS
///////////////////////

#[cfg(test)]
mod user_endpoints {
    use rocket::http::{ContentType, Header, Status};
    use rocket::local::asynchronous::Client;

    use crate::resp::jwt::HasAuthCookie;
    use crate::role::Role;
    use crate::test_support::test_rocket;

    fn login_form_body(id: &str, password: &str) -> String {
        format!("id={}&password={}", id, password)
    }

    #[rocket::async_test]
    async fn v1_login_submit_works() {
        let (rocket, ctx) = test_rocket();
        let client = Client::tracked(rocket).await.expect("invalid backend");

        let response = client
            .post("/api/v1/login")
            .header(Header::new(
                "Content-Type",
                "application/x-www-form-urlencoded",
            ))
            .body(login_form_body("S1001", "pass123"))
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::Ok, "an ok response");
        assert_eq!(
            response.content_type(),
            Some(ContentType::JSON),
            "not a application/json response"
        );

        let token = response
            .get_auth_cookie(&ctx.security.jwt_secret)
            .expect("jwt_auth cookie wasn't present");
        assert_eq!(token.user, "S1001");
        assert_eq!(token.role, Role::Student);
    }

    #[rocket::async_test]
    async fn v1_login_submit_rejects_bad_password() {
        let (rocket, ctx) = test_rocket();
        let client = Client::tracked(rocket).await.expect("invalid backend");

        let response = client
            .post("/api/v1/login")
            .header(Header::new(
                "Content-Type",
                "application/x-www-form-urlencoded",
            ))
            .body(login_form_body("S1001", "wrong"))
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::Unauthorized);
        assert!(response.get_auth_cookie(&ctx.security.jwt_secret).is_none());
    }
}
