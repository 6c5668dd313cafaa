use crate::reduce::RenderNode;
use crate::svg::{escape_xml, push_num};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Triangular arrowhead: the tip touching the target node's boundary, then the
/// two base corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowPolygon {
    pub tip: Point,
    pub left: Point,
    pub right: Point,
}

/// Computes the arrowhead for an edge drawn from `source` to `target`.
///
/// The arrow is as long as the target's size and half as wide. Returns `None`
/// when both endpoints coincide, since no direction can be derived.
pub fn arrow_polygon(source: &RenderNode, target: &RenderNode) -> Option<ArrowPolygon> {
    let dx = target.x - source.x;
    let dy = target.y - source.y;
    let length = (dx * dx + dy * dy).sqrt();
    if length == 0.0 || !length.is_finite() {
        return None;
    }
    let ux = dx / length;
    let uy = dy / length;

    let arrow_size = target.size;
    let arrow_width = arrow_size / 2.0;

    let tip = Point {
        x: target.x - ux * target.size,
        y: target.y - uy * target.size,
    };
    let left = Point {
        x: tip.x - arrow_size * ux + arrow_width * uy,
        y: tip.y - arrow_size * uy - arrow_width * ux,
    };
    let right = Point {
        x: tip.x - arrow_size * ux - arrow_width * uy,
        y: tip.y - arrow_size * uy + arrow_width * ux,
    };
    Some(ArrowPolygon { tip, left, right })
}

impl ArrowPolygon {
    pub fn points(&self) -> [Point; 3] {
        [self.tip, self.left, self.right]
    }

    pub fn to_svg(&self, fill: &str) -> String {
        let mut out = String::from("<polygon points=\"");
        for (idx, point) in self.points().iter().enumerate() {
            if idx > 0 {
                out.push(' ');
            }
            push_num(&mut out, point.x);
            out.push(',');
            push_num(&mut out, point.y);
        }
        out.push_str("\" fill=\"");
        out.push_str(&escape_xml(fill));
        out.push_str("\" />");
        out
    }
}
