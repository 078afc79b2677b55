//! Rewriting a parsed tree's spans into host coordinates.
//!
//! One pass, run exactly once per tree: the de-indented line span every
//! node had at parse time is cached into its raws first (host
//! coordinates cannot be cheaply inverted back at reconstruction time),
//! then both span endpoints are mapped. Mapping an already-annotated
//! tree again would compound the offsets, so `parse` owns the call.

use crate::region::Region;
use litcss_css::{Node, Root, Span};

pub(crate) fn annotate(root: &mut Root, region: &Region) {
    if let Some(span) = root.source {
        root.raws.lines = Some((span.start.line, span.end.line));
        root.source = Some(Span {
            start: region.map(span.start),
            end: region.map(span.end),
        });
    }
    annotate_nodes(&mut root.nodes, region);
}

fn annotate_nodes(nodes: &mut [Node], region: &Region) {
    for node in nodes {
        if let Some(span) = node.source().copied() {
            node.raws_mut().lines = Some((span.start.line, span.end.line));
            *node.source_mut() = Some(Span {
                start: region.map(span.start),
                end: region.map(span.end),
            });
        }
        if let Some(children) = node.children_mut() {
            annotate_nodes(children, region);
        }
    }
}
