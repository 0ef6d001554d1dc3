#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreadCrumb {
    pub url: String,
    pub title: String,
}

/// Navigation trail for one page render. Always starts at the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreadCrumbs {
    crumbs: Vec<BreadCrumb>,
}

impl BreadCrumbs {
    pub fn new() -> Self {
        Self {
            crumbs: vec![BreadCrumb {
                url: "/".into(),
                title: "Index".into(),
            }],
        }
    }

    pub fn push(&mut self, url: impl Into<String>, title: impl Into<String>) -> &mut Self {
        self.crumbs.push(BreadCrumb {
            url: url.into(),
            title: title.into(),
        });
        self
    }

    pub fn as_slice(&self) -> &[BreadCrumb] {
        &self.crumbs
    }

    pub fn into_vec(self) -> Vec<BreadCrumb> {
        self.crumbs
    }
}

impl Default for BreadCrumbs {
    fn default() -> Self {
        Self::new()
    }
}
