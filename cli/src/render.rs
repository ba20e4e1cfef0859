//! Terminal stand-ins for the list widget and the toast surface.

use std::cell::Cell;
use std::io::{self, Write};
use std::rc::Rc;

use postfeed_core::{Notification, NotificationLength, Notifier, Post, RenderSurface};

/// Remembers that the list needs a redraw; the main loop takes the flag
/// after each completion.
#[derive(Debug, Clone, Default)]
pub struct RedrawFlag(Rc<Cell<Option<usize>>>);

impl RedrawFlag {
    pub fn take(&self) -> Option<usize> {
        self.0.take()
    }
}

impl RenderSurface for RedrawFlag {
    fn invalidate_all(&mut self, len: usize) {
        self.0.set(Some(len));
    }
}

/// Writes notifications as single lines. Long-lived ones (errors) are marked
/// so they stand out.
pub struct StreamNotifier<W> {
    out: W,
}

impl<W: Write> StreamNotifier<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> Notifier for StreamNotifier<W> {
    fn notify(&mut self, notification: Notification) {
        let marker = match notification.length() {
            NotificationLength::Short => "--",
            NotificationLength::Long => "!!",
        };
        if let Err(e) = writeln!(self.out, "{marker} {}", notification.message()) {
            tracing::warn!(error = %e, "failed to show notification");
        }
    }
}

/// Draw every row: id, author, title, then the body indented below.
pub fn write_list<'a, W: Write>(
    out: &mut W,
    posts: impl IntoIterator<Item = &'a Post>,
) -> io::Result<()> {
    for post in posts {
        writeln!(out, "{:>4}  user {:<3} {}", post.id, post.user_id, post.title)?;
        for line in post.body.lines() {
            writeln!(out, "      {line}")?;
        }
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redraw_flag_is_taken_once() {
        let flag = RedrawFlag::default();
        let mut surface = flag.clone();
        surface.invalidate_all(4);
        assert_eq!(flag.take(), Some(4));
        assert_eq!(flag.take(), None);
    }

    #[test]
    fn notifier_marks_errors() {
        let mut notifier = StreamNotifier::new(Vec::new());
        notifier.notify(Notification::InProgress);
        notifier.notify(Notification::Error("Error fetching data: HTTP 500: x".to_string()));
        let text = String::from_utf8(notifier.out).unwrap();
        assert_eq!(
            text,
            "-- Fetching data...\n!! Error fetching data: HTTP 500: x\n"
        );
    }

    #[test]
    fn list_rows_indent_multiline_bodies() {
        let posts = vec![Post {
            user_id: 1,
            id: 7,
            title: "hello".to_string(),
            body: "line one\nline two".to_string(),
        }];
        let mut out = Vec::new();
        write_list(&mut out, &posts).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "   7  user 1   hello\n      line one\n      line two\n"
        );
    }

    #[test]
    fn empty_list_writes_nothing() {
        let mut out = Vec::new();
        write_list(&mut out, &Vec::<Post>::new()).unwrap();
        assert!(out.is_empty());
    }
}
