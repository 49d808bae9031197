use fnapi::http::StatusCode;
use fnapi::{
    Args, ArgMismatch, BoxError, BoxFuture, ContentType, Endpoint, File, Identity, Json, MethodFactory, ParamKind,
    ParamSpec, Payload, RegistrationError, Returns, Role, Signature, Slot, Token, UserId, UserName,
};

fn factory() -> MethodFactory {
    MethodFactory::new().token_validator(|_: &str| Ok::<_, fnapi::ValidationError>(Identity::new(1, "user")))
}

/// An endpoint that only describes a signature.
struct Described(Signature);

impl Endpoint for Described {
    fn signature(&self) -> Signature {
        self.0.clone()
    }

    fn call(&self, _: Args) -> BoxFuture<'_, Result<Returns, ArgMismatch>> {
        Box::pin(async { Ok(Returns::default()) })
    }
}

async fn all_roles(_: Token, _: UserId, _: UserName) -> (Payload, StatusCode, ContentType, Option<BoxError>) {
    (Payload::value(1), StatusCode::OK, ContentType::new("text/plain"), None)
}

async fn mixed(_: UserId, _: i64, _: String, _: File) -> (Option<BoxError>, Json<u8>) {
    (None, Json(0))
}

#[test]
fn valid() {
    let method = factory().try_build("/all", all_roles, true, vec![]).unwrap();
    assert_eq!(method.signature().params, vec![Slot::Token, Slot::UserId, Slot::UserName]);
    assert_eq!(
        method.signature().returns,
        vec![Role::Payload, Role::Status, Role::ContentType, Role::Error]
    );

    let params = vec![
        ParamSpec::int("a").required(),
        ParamSpec::string("b"),
        ParamSpec::file("c"),
    ];
    let method = factory().try_build("/mixed", mixed, true, params.clone()).unwrap();
    assert_eq!(method.path(), "/mixed");
    assert!(method.auth_required());
    assert_eq!(method.params(), &params[..]);
}

#[test]
fn arity() {
    async fn two(_: i64, _: i64) {}

    let err = factory()
        .try_build("/two", two, false, vec![ParamSpec::int("a")])
        .unwrap_err();

    assert_eq!(
        err,
        RegistrationError::Arity {
            path: "/two".into(),
            actual: 2,
            expected: 1,
            declared: 1,
            implicit: 0,
        }
    );
    assert_eq!(
        err.to_string(),
        "API handler (/two) actually expects 2 parameters, but is defined to expect 1 (1 defined, 0 implicit)"
    );
}

#[test]
fn identity_without_auth() {
    async fn who(_: UserName) {}

    let err = factory().try_build("/who", who, false, vec![]).unwrap_err();
    assert_eq!(
        err,
        RegistrationError::IdentityWithoutAuth {
            path: "/who".into(),
            slot: Slot::UserName,
        }
    );
}

#[test]
fn kind_mismatch() {
    async fn takes_int(_: i64) {}

    let err = factory()
        .try_build("/n", takes_int, false, vec![ParamSpec::string("n")])
        .unwrap_err();

    assert_eq!(
        err,
        RegistrationError::KindMismatch {
            path: "/n".into(),
            name: "n".into(),
            expected: ParamKind::String,
            actual: Slot::Int,
        }
    );
}

#[test]
fn duplicate_returns() {
    async fn two_statuses() -> (u16, StatusCode) {
        (200, StatusCode::OK)
    }

    let err = factory().try_build("/dup", two_statuses, false, vec![]).unwrap_err();
    assert_eq!(
        err,
        RegistrationError::DuplicateReturn {
            path: "/dup".into(),
            role: Role::Status,
        }
    );
}

#[test]
fn too_many_returns() {
    let endpoint = Described(Signature::new(
        vec![],
        vec![Role::Payload, Role::Status, Role::ContentType, Role::Error, Role::Payload],
    ));

    let err = factory().try_build("/many", endpoint, false, vec![]).unwrap_err();
    assert_eq!(
        err,
        RegistrationError::TooManyReturns {
            path: "/many".into(),
            count: 5,
        }
    );
}

#[test]
fn missing_token_validator() {
    async fn open() {}

    let err = MethodFactory::new().try_build("/open", open, true, vec![]).unwrap_err();
    assert_eq!(err, RegistrationError::MissingTokenValidator { path: "/open".into() });

    assert!(MethodFactory::new().try_build("/open", open, false, vec![]).is_ok());
}

#[test]
fn bad_params() {
    async fn one(_: i64) {}
    async fn two(_: i64, _: i64) {}

    let err = factory()
        .try_build("/p", one, false, vec![ParamSpec::int("")])
        .unwrap_err();
    assert_eq!(err, RegistrationError::EmptyParamName { path: "/p".into() });

    let err = factory()
        .try_build("/p", two, false, vec![ParamSpec::int("a"), ParamSpec::int("a")])
        .unwrap_err();
    assert_eq!(
        err,
        RegistrationError::DuplicateParam {
            path: "/p".into(),
            name: "a".into(),
        }
    );

    let err = factory().try_build("", one, false, vec![ParamSpec::int("a")]).unwrap_err();
    assert_eq!(err, RegistrationError::EmptyPath);
}

#[test]
#[should_panic(expected = "actually expects 1 parameters")]
fn build_panics() {
    async fn one(_: i64) {}

    factory().build("/one", one, false, vec![]);
}

#[test]
fn config() {
    let config: fnapi::Config = serde_json::from_str(
        r#"{ "content_type": "text/plain", "token_param": "token", "memory_limit": 1024 }"#,
    )
    .unwrap();

    assert_eq!(config.content_type.as_deref(), Some("text/plain"));
    assert_eq!(config.token_param.as_deref(), Some("token"));
    assert_eq!(config.memory_limit, Some(1024));
    assert_eq!(config.body_limit, None);

    async fn open() {}
    let method = MethodFactory::new().with_config(&config).build("/open", open, false, vec![]);
    assert_eq!(method.path(), "/open");
}
