use askama::Template;
use rf_core::models::{Forum, Id, Post, TopicSummary};
use rf_core::paging::PageLink;

use crate::breadcrumbs::{BreadCrumb, BreadCrumbs};
use crate::format::format_post_body;

/// Everything the shared layout needs: trail, flashes and who is signed in.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    pub breadcrumbs: Vec<BreadCrumb>,
    pub error_flashes: Vec<String>,
    pub success_flashes: Vec<String>,
    pub signed_in: bool,
    pub user_id: Id,
    pub username: String,
}

impl PageContext {
    pub fn new(breadcrumbs: BreadCrumbs) -> Self {
        Self {
            breadcrumbs: breadcrumbs.into_vec(),
            user_id: rf_core::models::UNSAVED_ID,
            ..Self::default()
        }
    }

    pub fn with_flashes(mut self, errors: Vec<String>, successes: Vec<String>) -> Self {
        self.error_flashes = errors;
        self.success_flashes = successes;
        self
    }

    pub fn with_user(mut self, id: Id, username: impl Into<String>) -> Self {
        self.signed_in = true;
        self.user_id = id;
        self.username = username.into();
        self
    }
}

/// Page number links under a listing. Hidden when there is a single page.
#[derive(Debug, Clone)]
pub struct Pager {
    pub base_url: String,
    pub links: Vec<PageLink>,
}

impl Pager {
    pub fn new(base_url: impl Into<String>, links: Vec<PageLink>) -> Self {
        Self {
            base_url: base_url.into(),
            links,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.links.len() > 1
    }
}

/// A post prepared for display.
#[derive(Debug, Clone)]
pub struct PostView {
    pub id: Id,
    pub author: String,
    pub published: String,
    pub body_html: String,
    /// Whether the viewer may delete it.
    pub deletable: bool,
}

impl PostView {
    pub fn from_post(post: &Post, viewer: Option<Id>) -> Self {
        Self {
            id: post.id,
            author: post
                .author
                .as_ref()
                .map(|a| a.username.clone())
                .unwrap_or_default(),
            published: post.published.format("%Y-%m-%d %H:%M UTC").to_string(),
            body_html: format_post_body(&post.text),
            deletable: viewer.is_some_and(|id| post.is_authored_by(id)),
        }
    }
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate<'a> {
    pub ctx: PageContext,
    pub forums: &'a [Forum],
}

#[derive(Template)]
#[template(path = "forum.html")]
pub struct ForumTemplate<'a> {
    pub ctx: PageContext,
    pub forum: &'a Forum,
    pub topics: &'a [TopicSummary],
    pub pager: Pager,
}

#[derive(Template)]
#[template(path = "topic.html")]
pub struct TopicTemplate<'a> {
    pub ctx: PageContext,
    pub forum: &'a Forum,
    pub topic: &'a TopicSummary,
    pub posts: Vec<PostView>,
    pub pager: Pager,
}

#[derive(Template)]
#[template(path = "add_topic.html")]
pub struct AddTopicTemplate<'a> {
    pub ctx: PageContext,
    pub forum: &'a Forum,
}

#[derive(Template)]
#[template(path = "add_post.html")]
pub struct AddPostTemplate<'a> {
    pub ctx: PageContext,
    pub topic: &'a TopicSummary,
}

#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    pub ctx: PageContext,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub ctx: PageContext,
    /// Where to go after a successful login; empty means the index.
    pub referer: String,
}
