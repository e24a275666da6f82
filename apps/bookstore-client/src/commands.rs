use bookstore_session::{
    AuthOutcome, Credentials, GuardDecision, Navigator, RegisterForm, Storefront,
};

/// Navigator for a terminal: there is no page to change, so the target is
/// reported on stderr.
struct ConsoleNavigator;

impl Navigator for ConsoleNavigator {
    fn navigate(&self, path: &str) {
        eprintln!("redirect: {path}");
    }
}

fn finish(outcome: AuthOutcome) -> anyhow::Result<()> {
    match outcome {
        AuthOutcome::Success { message, session } => {
            println!("{message}");
            if let Some(session) = session {
                println!("signed in as {} ({})", session.email, session.id);
            }
            Ok(())
        }
        AuthOutcome::Failure { message } => anyhow::bail!("{message}"),
    }
}

pub async fn login(app: &Storefront, email: String, password: String) -> anyhow::Result<()> {
    let outcome = app
        .session
        .login(&Credentials::new(email, password))
        .await;
    finish(outcome)
}

pub async fn register(app: &Storefront, form: &RegisterForm) -> anyhow::Result<()> {
    finish(app.session.register(form).await)
}

pub fn logout(app: &Storefront) {
    app.session.logout();
    println!("signed out");
}

pub fn whoami(app: &Storefront) {
    let locale = app.locale.current();
    match app.session.user() {
        Some(user) => println!("{} ({}) lang={} dir={}", user.email, user.id, locale.lang, locale.dir),
        None => println!("not signed in lang={} dir={}", locale.lang, locale.dir),
    }
}

pub fn locale(app: &Storefront, lang: Option<&str>) -> anyhow::Result<()> {
    let locale = match lang {
        Some(tag) => app.locale.set_language(tag)?,
        None => app.locale.current(),
    };
    println!("lang={} dir={}", locale.lang, locale.dir);
    Ok(())
}

pub fn guard(app: &Storefront, path: &str, guest: bool) {
    let decision = if guest {
        app.guest_guard().check(path)
    } else {
        app.auth_guard().check(path)
    };
    match decision {
        GuardDecision::Allow => println!("allow"),
        GuardDecision::Redirect {
            to,
            return_url: Some(back),
        } => println!("redirect {to} returnUrl={back}"),
        GuardDecision::Redirect {
            to,
            return_url: None,
        } => println!("redirect {to}"),
    }
}

pub fn session_id(app: &Storefront) -> anyhow::Result<()> {
    println!("{}", app.context.ensure_session_id()?);
    Ok(())
}

pub async fn get(app: &Storefront, path: &str, query: &[(String, String)]) -> anyhow::Result<()> {
    match app
        .api
        .get_data_with_query::<serde_json::Value, _>(path, query)
        .await
    {
        Ok(data) => {
            println!("{}", serde_json::to_string_pretty(&data)?);
            Ok(())
        }
        Err(err) => {
            tracing::debug!(error = %err, "request failed");
            app.session.handle_api_error(&err, &ConsoleNavigator);
            anyhow::bail!("{}", err.user_message())
        }
    }
}

/// Parse a `key=value` query pair.
pub fn parse_query_pair(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .filter(|(k, _)| !k.is_empty())
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .ok_or_else(|| format!("expected key=value, got {raw:?}"))
}
