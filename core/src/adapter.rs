//! The list display adapter: sole owner of what the list widget shows.
//!
//! # Design
//! Every update is a full replace followed by one `invalidate_all` signal to
//! the rendering surface. There is no incremental path, so the surface never
//! sees a half-applied batch.

use crate::types::Post;

/// Whatever draws the list. Told only that everything must be redrawn.
pub trait RenderSurface {
    fn invalidate_all(&mut self, len: usize);
}

impl<F> RenderSurface for F
where
    F: FnMut(usize),
{
    fn invalidate_all(&mut self, len: usize) {
        self(len)
    }
}

/// A surface that ignores invalidations, for hosts that poll the adapter.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedSurface;

impl RenderSurface for DetachedSurface {
    fn invalidate_all(&mut self, _len: usize) {}
}

/// Holds the current display collection in server order.
#[derive(Debug)]
pub struct ListAdapter<S> {
    posts: Vec<Post>,
    surface: S,
}

impl<S: RenderSurface> ListAdapter<S> {
    pub fn new(surface: S) -> Self {
        Self {
            posts: Vec::new(),
            surface,
        }
    }

    /// Discard the held posts, take ownership of `posts`, and invalidate the
    /// whole visible range.
    pub fn replace_all(&mut self, posts: Vec<Post>) {
        self.posts = posts;
        tracing::trace!(len = self.posts.len(), "display collection replaced");
        self.surface.invalidate_all(self.posts.len());
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// The post at `position`, for the rendering surface.
    ///
    /// # Panics
    /// If `position >= len()`. The surface only asks for rows it was told
    /// exist, so anything else is a bug in the caller.
    pub fn item(&self, position: usize) -> &Post {
        debug_assert!(
            position < self.posts.len(),
            "list position {position} out of range (len {})",
            self.posts.len()
        );
        &self.posts[position]
    }

    pub fn get(&self, position: usize) -> Option<&Post> {
        self.posts.get(position)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Post> {
        self.posts.iter()
    }

    pub fn as_slice(&self) -> &[Post] {
        &self.posts
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }
}

impl<'a, S> IntoIterator for &'a ListAdapter<S> {
    type Item = &'a Post;
    type IntoIter = std::slice::Iter<'a, Post>;

    fn into_iter(self) -> Self::IntoIter {
        self.posts.iter()
    }
}
