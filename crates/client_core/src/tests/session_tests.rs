use super::*;

fn session_path(dir: &tempfile::TempDir) -> PathBuf {
    dir.path().join("nested").join("session.json")
}

#[test]
fn starts_logged_out_without_a_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let session = Session::init(session_path(&dir));

    assert!(!session.is_authenticated());
    assert!(matches!(
        session.require_authenticated(),
        Err(SessionError::Unauthenticated)
    ));
}

#[test]
fn login_persists_across_init() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = session_path(&dir);

    let mut session = Session::init(&path);
    session.login(DEMO_EMAIL, DEMO_PASSWORD).expect("login");
    assert!(session.require_authenticated().is_ok());

    let restored = Session::init(&path);
    assert!(restored.is_authenticated());
    assert_eq!(restored.email(), Some(DEMO_EMAIL));
}

#[test]
fn wrong_password_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = session_path(&dir);
    let mut session = Session::init(&path);

    let err = session
        .login(DEMO_EMAIL, "hunter2")
        .expect_err("bad password");

    assert_eq!(err.to_string(), "invalid email or password");
    assert!(!session.is_authenticated());
    assert!(!path.exists());
}

#[test]
fn teardown_clears_the_flag() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = session_path(&dir);
    let mut session = Session::init(&path);
    session.login(DEMO_EMAIL, DEMO_PASSWORD).expect("login");

    session.teardown().expect("teardown");

    assert!(!session.is_authenticated());
    assert!(!path.exists());
    assert!(!Session::init(&path).is_authenticated());
    session.teardown().expect("second teardown is harmless");
}

#[test]
fn corrupt_file_means_logged_out() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("session.json");
    fs::write(&path, "{not json").expect("write");

    assert!(!Session::init(&path).is_authenticated());
}

#[test]
fn explicit_false_flag_means_logged_out() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("session.json");
    fs::write(&path, r#"{"authenticated":false,"email":"test@example.com"}"#).expect("write");

    let session = Session::init(&path);
    assert!(!session.is_authenticated());
    assert_eq!(session.email(), None);
}
