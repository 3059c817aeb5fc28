use crate::selection::Selection;
use crate::time::Time;

use super::TraceView;

impl TraceView {
    /// Scope path and time window as `"/<name>/…/:<min>:<max>"`.
    ///
    /// `%`, `/` and `:` in names are percent-encoded. Filters are not saved.
    pub fn save(&self) -> String {
        let mut names = Vec::new();
        let mut cur = self.parent_component();
        while let Some(c) = cur {
            names.push(self.components().item(c).as_str());
            cur = self.components().item_parent(c);
        }
        names.reverse();

        let mut path = String::from("/");
        for name in names {
            escape_segment(name, &mut path);
            path.push('/');
        }
        format!("{path}:{}:{}", self.min_time(), self.max_time())
    }

    /// Inverse of [`TraceView::save`], keeping this view's filters.
    ///
    /// Best effort: a malformed string, a path through components that no
    /// longer exist, or a reversed window yields an unchanged copy.
    pub fn restore(&self, saved: &str) -> TraceView {
        match self.parse_saved(saved) {
            Some((scope, min, max)) => {
                let mut n = self.set_parent_component(scope);
                n.min = min;
                n.max = max;
                n
            }
            None => {
                tracing::debug!(saved, "saved view does not match this trace, ignoring");
                self.clone()
            }
        }
    }

    fn parse_saved(&self, saved: &str) -> Option<(Option<usize>, Time, Time)> {
        let mut parts = saved.split(':');
        let (path, min, max) = (parts.next()?, parts.next()?, parts.next()?);
        if parts.next().is_some() {
            return None;
        }

        let mut scope = Selection::ROOT;
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            let name = unescape_segment(segment)?;
            scope = Some(self.components().find_item(&name, scope)?);
        }

        let unit = self.source().time_unit();
        let min = Time::parse(unit, min)?;
        let max = Time::parse(unit, max)?;
        (min <= max).then_some((scope, min, max))
    }
}

fn escape_segment(name: &str, out: &mut String) {
    for ch in name.chars() {
        match ch {
            '%' => out.push_str("%25"),
            '/' => out.push_str("%2F"),
            ':' => out.push_str("%3A"),
            _ => out.push(ch),
        }
    }
}

fn unescape_segment(segment: &str) -> Option<String> {
    let mut out = String::with_capacity(segment.len());
    let mut rest = segment;
    while let Some(i) = rest.find('%') {
        out.push_str(&rest[..i]);
        let decoded = match rest.get(i + 1..i + 3)? {
            "25" => '%',
            "2F" | "2f" => '/',
            "3A" | "3a" => ':',
            _ => return None,
        };
        out.push(decoded);
        rest = &rest[i + 3..];
    }
    out.push_str(rest);
    Some(out)
}
