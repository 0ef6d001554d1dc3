//! # rf-api Handlers
//!
//! Each handler parses its input, talks to the repository ports and either
//! renders a page or redirects with flash messages.

use axum::{
    extract::{Form, Path, State},
    http::{header, HeaderMap},
    response::{Html, IntoResponse, Redirect, Response},
};
use rf_core::error::AppError;
use rf_core::models::{Id, User, UNSAVED_ID};
use rf_core::paging::{last_page, page_links, Page};
use rf_core::validation::{validate_post, validate_topic, validate_user};
use rf_ui::{
    AddPostTemplate, AddTopicTemplate, BreadCrumbs, ForumTemplate, IndexTemplate, LoginTemplate,
    PageContext, Pager, PostView, RegisterTemplate, Template, TopicTemplate,
};
use tower_sessions::Session;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::forms::{
    parse_delete, parse_login, parse_post, parse_registration, parse_topic, FormFields,
};
use crate::session::{
    add_error_flash, add_error_flashes, add_success_flash, current_user_id, sign_in, sign_out,
    take_flashes, ERROR_FLASHES, SUCCESS_FLASHES,
};
use crate::state::AppState;

pub type HtmlResult = Result<Html<String>, ApiError>;
pub type RedirectResult = Result<Response, ApiError>;

const INVALID_LOGIN: &str = "Invalid username or password.";

fn render<T: Template>(template: T) -> HtmlResult {
    Ok(Html(template.render()?))
}

fn see_other(location: &str) -> RedirectResult {
    Ok(Redirect::to(location).into_response())
}

/// Session user, if any. A session pointing at a vanished user is signed out.
async fn current_user(state: &AppState, session: &Session) -> Result<Option<User>, ApiError> {
    let Some(id) = current_user_id(session).await? else {
        return Ok(None);
    };
    match state.users.find_one_by_id(id).await {
        Ok(user) => Ok(Some(user)),
        Err(AppError::NotFound(..)) => {
            warn!(user_id = id, "session refers to missing user");
            sign_out(session).await?;
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Layout data for one render. Consumes pending flashes.
async fn page_context(
    state: &AppState,
    session: &Session,
    breadcrumbs: BreadCrumbs,
) -> Result<PageContext, ApiError> {
    let errors = take_flashes(session, ERROR_FLASHES).await?;
    let successes = take_flashes(session, SUCCESS_FLASHES).await?;
    let ctx = PageContext::new(breadcrumbs).with_flashes(errors, successes);

    Ok(match current_user(state, session).await? {
        Some(user) => ctx.with_user(user.id, user.username),
        None => ctx,
    })
}

/// Reduces a referer to a local path. Foreign hosts and the login page
/// itself are refused.
pub(crate) fn same_site_path(raw: &str, host: Option<&str>) -> Option<String> {
    let raw = raw.trim();
    let path = if raw.starts_with('/') {
        raw.to_string()
    } else {
        let rest = raw
            .strip_prefix("http://")
            .or_else(|| raw.strip_prefix("https://"))?;
        let (authority, path) = match rest.find('/') {
            Some(i) => (&rest[..i], &rest[i..]),
            None => (rest, "/"),
        };
        if Some(authority) != host {
            return None;
        }
        path.to_string()
    };

    if path.starts_with("//") || path.starts_with("/\\") {
        return None;
    }
    let without_query = path.split(['?', '#']).next().unwrap_or_default();
    if without_query.trim_end_matches('/').ends_with("/user/login") {
        return None;
    }
    Some(path)
}

fn referer_path(headers: &HeaderMap) -> Option<String> {
    let referer = headers.get(header::REFERER)?.to_str().ok()?;
    let host = headers.get(header::HOST).and_then(|h| h.to_str().ok());
    same_site_path(referer, host)
}

// ── Index ───────────────────────────────────────────────────────────────────

pub async fn index(State(state): State<AppState>, session: Session) -> HtmlResult {
    let forums = state.forums.find_all().await?;
    let ctx = page_context(&state, &session, BreadCrumbs::new()).await?;
    render(IndexTemplate { ctx, forums: &forums })
}

// ── Forums ──────────────────────────────────────────────────────────────────

pub async fn show_forum(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Id>,
) -> HtmlResult {
    forum_page(state, session, id, None).await
}

pub async fn show_forum_page(
    State(state): State<AppState>,
    session: Session,
    Path((id, page)): Path<(Id, i64)>,
) -> HtmlResult {
    forum_page(state, session, id, Some(page)).await
}

async fn forum_page(state: AppState, session: Session, id: Id, page: Option<i64>) -> HtmlResult {
    let forum = state.forums.find_one(id).await?;
    let per_page = state.pagination.topics_per_page;
    let page = Page::from_param(page, per_page);
    let topics = state.topics.find_page(id, page.limit(), page.offset()).await?;

    let mut crumbs = BreadCrumbs::new();
    crumbs.push(format!("/forum/{id}"), forum.title.clone());
    if page.number > 1 {
        crumbs.push(
            format!("/forum/{id}/page/{}", page.number),
            format!("page {}", page.number),
        );
    }

    let pager = Pager::new(
        format!("/forum/{id}"),
        page_links(forum.topic_count, per_page, page.number),
    );
    let ctx = page_context(&state, &session, crumbs).await?;
    render(ForumTemplate {
        ctx,
        forum: &forum,
        topics: &topics,
        pager,
    })
}

pub async fn add_topic_form(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Id>,
) -> HtmlResult {
    let forum = state.forums.find_one(id).await?;

    let mut crumbs = BreadCrumbs::new();
    crumbs
        .push(format!("/forum/{id}"), forum.title.clone())
        .push(format!("/forum/{id}/add"), "New topic");

    let ctx = page_context(&state, &session, crumbs).await?;
    render(AddTopicTemplate { ctx, forum: &forum })
}

pub async fn save_topic(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Id>,
    Form(fields): Form<FormFields>,
) -> RedirectResult {
    let topic = parse_topic(id, fields)?;

    let validation = validate_topic(&*state.forums, &topic).await?;
    if !validation.is_valid() {
        add_error_flashes(&session, validation.errors()).await?;
        return see_other(&format!("/forum/{id}/add"));
    }

    let topic_id = state.topics.save(&topic).await?;
    info!(topic_id, forum_id = id, "topic created");
    add_success_flash(&session, "Topic created.").await?;
    see_other(&format!("/forum/{id}"))
}

// ── Topics & posts ──────────────────────────────────────────────────────────

pub async fn show_topic(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Id>,
) -> HtmlResult {
    topic_page(state, session, id, None).await
}

pub async fn show_topic_page(
    State(state): State<AppState>,
    session: Session,
    Path((id, page)): Path<(Id, i64)>,
) -> HtmlResult {
    topic_page(state, session, id, Some(page)).await
}

async fn topic_page(state: AppState, session: Session, id: Id, page: Option<i64>) -> HtmlResult {
    let detail = state.topics.find_one(id).await?;
    let per_page = state.pagination.posts_per_page;
    let page = Page::from_param(page, per_page);
    let posts = state.posts.find_page(id, page.limit(), page.offset()).await?;

    let mut crumbs = BreadCrumbs::new();
    crumbs
        .push(format!("/forum/{}", detail.forum.id), detail.forum.title.clone())
        .push(format!("/topic/{id}"), detail.topic.title.clone());
    if page.number > 1 {
        crumbs.push(
            format!("/topic/{id}/page/{}", page.number),
            format!("page {}", page.number),
        );
    }

    let ctx = page_context(&state, &session, crumbs).await?;
    let viewer = ctx.signed_in.then_some(ctx.user_id);
    let posts = posts.iter().map(|p| PostView::from_post(p, viewer)).collect();
    let pager = Pager::new(
        format!("/topic/{id}"),
        page_links(detail.topic.post_count, per_page, page.number),
    );

    render(TopicTemplate {
        ctx,
        forum: &detail.forum,
        topic: &detail.topic,
        posts,
        pager,
    })
}

pub async fn add_post_form(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Id>,
) -> HtmlResult {
    let detail = state.topics.find_one(id).await?;

    let mut crumbs = BreadCrumbs::new();
    crumbs
        .push(format!("/forum/{}", detail.forum.id), detail.forum.title.clone())
        .push(format!("/topic/{id}"), detail.topic.title.clone())
        .push(format!("/topic/{id}/add"), "Reply");

    let ctx = page_context(&state, &session, crumbs).await?;
    render(AddPostTemplate {
        ctx,
        topic: &detail.topic,
    })
}

pub async fn save_post(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Id>,
    Form(fields): Form<FormFields>,
) -> RedirectResult {
    let mut post = parse_post(id, fields)?;
    post.user_id = current_user_id(&session).await?.unwrap_or(UNSAVED_ID);

    let validation = validate_post(&*state.topics, &*state.users, &post).await?;
    if !validation.is_valid() {
        add_error_flashes(&session, validation.errors()).await?;
        return see_other(&format!("/topic/{id}/add"));
    }

    let post_id = state.posts.save(&post).await?;
    info!(post_id, topic_id = id, user_id = post.user_id, "post created");

    let detail = state.topics.find_one(id).await?;
    let last = last_page(detail.topic.post_count, state.pagination.posts_per_page);
    see_other(&format!("/topic/{id}/page/{last}"))
}

pub async fn delete_post(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Id>,
    Form(fields): Form<FormFields>,
) -> RedirectResult {
    let post_id = parse_delete(fields)?;
    let back = format!("/topic/{id}");

    let Some(user_id) = current_user_id(&session).await? else {
        add_error_flash(&session, crate::middleware::LOGIN_REQUIRED).await?;
        return see_other(&back);
    };

    let post = match state.posts.find_one(post_id).await {
        Ok(post) => post,
        Err(e @ AppError::NotFound(..)) => {
            add_error_flash(&session, e.to_string()).await?;
            return see_other(&back);
        }
        Err(e) => return Err(e.into()),
    };

    if !post.is_authored_by(user_id) {
        warn!(post_id, user_id, "refused to delete someone else's post");
        add_error_flash(&session, "You can only delete your own posts!").await?;
        return see_other(&back);
    }

    state.posts.delete(post.id).await?;
    info!(post_id, user_id, "post deleted");
    add_success_flash(&session, "Post deleted.").await?;
    see_other(&format!("/topic/{}", post.topic_id))
}

// ── Users ───────────────────────────────────────────────────────────────────

pub async fn register_form(State(state): State<AppState>, session: Session) -> HtmlResult {
    let mut crumbs = BreadCrumbs::new();
    crumbs.push("/user/add", "Register");
    let ctx = page_context(&state, &session, crumbs).await?;
    render(RegisterTemplate { ctx })
}

pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(fields): Form<FormFields>,
) -> RedirectResult {
    let user = parse_registration(fields)?;

    let validation = validate_user(&*state.users, &user).await?;
    if !validation.is_valid() {
        add_error_flashes(&session, validation.errors()).await?;
        return see_other("/user/add");
    }

    let hasher = state.hasher.clone();
    let user = tokio::task::spawn_blocking(move || {
        let mut user = user;
        user.hash_password(&*hasher).map(|()| user)
    })
    .await??;

    match state.users.save(&user).await {
        Ok(user_id) => {
            info!(user_id, username = %user.username, "user registered");
            add_success_flash(&session, "Registration complete. You can log in now.").await?;
            see_other("/")
        }
        // Lost a race against another registration with the same name.
        Err(AppError::ValidationFailed(errors)) => {
            add_error_flashes(&session, &errors).await?;
            see_other("/user/add")
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn login_form(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
) -> HtmlResult {
    let mut crumbs = BreadCrumbs::new();
    crumbs.push("/user/login", "Login");
    let ctx = page_context(&state, &session, crumbs).await?;
    render(LoginTemplate {
        ctx,
        referer: referer_path(&headers).unwrap_or_default(),
    })
}

pub async fn login(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(fields): Form<FormFields>,
) -> RedirectResult {
    let mut form = parse_login(fields)?;

    if form.username.is_empty() || form.password.is_empty() {
        add_error_flash(&session, "Enter a username and password.").await?;
        return see_other("/user/login");
    }

    let user = match state.users.find_one_by_username(&form.username).await {
        Ok(user) => user,
        Err(AppError::NotFound(..)) => {
            info!(username = %form.username, "login for unknown user");
            add_error_flash(&session, INVALID_LOGIN).await?;
            return see_other("/user/login");
        }
        Err(e) => return Err(e.into()),
    };

    let hasher = state.hasher.clone();
    let mut password = std::mem::take(&mut form.password);
    let user_id = user.id;
    let outcome =
        tokio::task::spawn_blocking(move || user.verify_password(&*hasher, &mut password)).await?;

    match outcome {
        Ok(()) => {}
        Err(AppError::Unauthorized(_) | AppError::PreconditionFailed(_)) => {
            info!(user_id, "login with wrong password");
            add_error_flash(&session, INVALID_LOGIN).await?;
            return see_other("/user/login");
        }
        Err(e) => return Err(e.into()),
    }

    sign_in(&session, user_id).await?;
    info!(user_id, "user logged in");
    add_success_flash(&session, "Successfully logged in!").await?;

    let host = headers.get(header::HOST).and_then(|h| h.to_str().ok());
    let target = same_site_path(&form.referer, host).unwrap_or_else(|| "/".into());
    see_other(&target)
}

pub async fn logout(session: Session, headers: HeaderMap) -> RedirectResult {
    if let Some(user_id) = current_user_id(&session).await? {
        info!(user_id, "user logged out");
    }
    sign_out(&session).await?;
    add_success_flash(&session, "Successfully logged out.").await?;
    see_other(&referer_path(&headers).unwrap_or_else(|| "/".into()))
}
