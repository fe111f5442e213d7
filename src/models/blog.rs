//! Blog post model.

use serde::{Deserialize, Serialize};

/// Blog post stored in the `blogs` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blog {
    pub id: String,
    pub title: String,
    /// Short teaser; the wire name keeps the spelling clients already use.
    #[serde(rename = "summery")]
    pub summary: String,
    pub description: String,
    /// Image URL
    pub img: String,
    pub created_at: String,
}

/// Listing view without the (large) description.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogSummary {
    pub id: String,
    pub title: String,
    #[serde(rename = "summery")]
    pub summary: String,
    pub img: String,
    pub created_at: String,
}

impl From<Blog> for BlogSummary {
    fn from(blog: Blog) -> Self {
        Self {
            id: blog.id,
            title: blog.title,
            summary: blog.summary,
            img: blog.img,
            created_at: blog.created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewBlog {
    pub title: String,
    pub summary: String,
    pub description: String,
    pub img: String,
}

impl NewBlog {
    pub fn into_blog(self, id: String, created_at: String) -> Blog {
        Blog {
            id,
            title: self.title,
            summary: self.summary,
            description: self.description,
            img: self.img,
            created_at,
        }
    }
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct BlogUpdate {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub img: Option<String>,
}

impl BlogUpdate {
    pub fn apply(self, blog: &mut Blog) {
        if let Some(title) = self.title {
            blog.title = title;
        }
        if let Some(summary) = self.summary {
            blog.summary = summary;
        }
        if let Some(description) = self.description {
            blog.description = description;
        }
        if let Some(img) = self.img {
            blog.img = img;
        }
    }
}
