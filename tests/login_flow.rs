use std::convert::Infallible;

use gatehouse::{
    auth::ExtensionState,
    extract::return_to,
    header::LOCATION,
    logging::init_logging,
    middleware::AuthGate,
    AuthConfig, AuthDecisionPolicy, Body, Endpoint, GuardedNavigator, Middleware,
    NavigationTarget, RedirectLocation, Request, Response, StatusCode, View, ViewSelector,
};

#[derive(Debug, Clone)]
struct Session {
    user: String,
    revoked: bool,
}

struct Dashboard;

impl Endpoint for Dashboard {
    type Error = Infallible;
    async fn respond(&mut self, request: &mut Request) -> Result<Response, Self::Error> {
        let user = request
            .extensions()
            .get::<Session>()
            .map_or_else(String::new, |session| session.user.clone());
        Ok(Response::new(Body::from(format!("hello {user}"))))
    }
}

fn gate() -> AuthGate<ExtensionState<Session>> {
    let config = AuthConfig::builder()
        .authenticated(|session: &Option<Session>, _: &Request| {
            session.as_ref().is_some_and(|session| !session.revoked)
        })
        .redirect_path("/login")
        .build()
        .unwrap();
    AuthGate::new(ExtensionState::new(), config)
}

fn request(path_and_query: &str, session: Option<Session>) -> Request {
    let mut request = Request::new(Body::empty());
    *request.uri_mut() = format!("http://localhost{path_and_query}")
        .parse()
        .expect("invalid uri");
    if let Some(session) = session {
        request.extensions_mut().insert(session);
    }
    request
}

fn alice() -> Session {
    Session {
        user: "alice".to_owned(),
        revoked: false,
    }
}

#[tokio::test]
async fn denied_visitor_is_sent_back_after_login() {
    init_logging();
    let mut gate = gate();

    let mut anonymous = request("/dashboard?tab=billing", None);
    let response = gate.handle(&mut anonymous, &mut Dashboard).await.unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    let location = response
        .headers()
        .get(LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_owned();
    assert_eq!(location, "/login?redirect=%2Fdashboard%3Ftab%3Dbilling");

    let login_page = request(&location, None);
    let back = return_to(&login_page, gate.query_param()).unwrap();
    assert_eq!(back, "/dashboard?tab=billing");

    let mut signed_in = request(&back, Some(alice()));
    let response = gate.handle(&mut signed_in, &mut Dashboard).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().into_bytes().await.unwrap();
    assert_eq!(body.as_ref(), b"hello alice");
}

#[tokio::test]
async fn revoked_session_is_redirected_again() {
    init_logging();
    let mut gate = gate();

    let mut signed_in = request("/dashboard", Some(alice()));
    let response = gate.handle(&mut signed_in, &mut Dashboard).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let revoked = Session {
        revoked: true,
        ..alice()
    };
    let mut signed_out = request("/dashboard", Some(revoked));
    let response = gate.handle(&mut signed_out, &mut Dashboard).await.unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.headers().get(LOCATION).unwrap(),
        "/login?redirect=%2Fdashboard"
    );
}

#[test]
fn client_side_view_navigates_once_per_denial() {
    let policy = AuthDecisionPolicy::new(
        AuthConfig::<Option<Session>, ()>::builder()
            .authenticated(|session, ()| session.as_ref().is_some_and(|session| !session.revoked))
            .authenticating(|session, ()| session.as_ref().is_some_and(|session| session.user.is_empty()))
            .redirect_path("/login")
            .build()
            .unwrap(),
    );
    let mut selector = ViewSelector::new(&policy);
    let mut navigated = Vec::new();
    let mut navigator =
        GuardedNavigator::new(|location: &RedirectLocation| navigated.push(location.to_string()));
    let target = NavigationTarget::parse("/dashboard");

    let signing_in = Session {
        user: String::new(),
        revoked: false,
    };

    // Denied, signing in, signed in, then revoked; each denial renders twice.
    let sessions = [None, None, Some(signing_in), Some(alice()), None, None];
    let views: Vec<View> = sessions
        .iter()
        .map(|session| {
            let view = selector.update(session, &(), Some(&target)).unwrap();
            navigator.follow(&view, Some(&target));
            view
        })
        .collect();

    assert_eq!(views[2], View::Loading);
    assert_eq!(views[3], View::Protected);

    drop(navigator);
    assert_eq!(
        navigated,
        vec![
            "/login?redirect=%2Fdashboard".to_owned(),
            "/login?redirect=%2Fdashboard".to_owned(),
        ]
    );
}
