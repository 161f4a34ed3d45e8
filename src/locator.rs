/// Pick the post the user is most likely looking at
use crate::dom::PostNode;

/// Return the post whose vertical center is nearest the middle of the viewport.
///
/// Posts with a 0x0 box are unrendered placeholders and never win. A post that
/// cannot be measured is skipped. On an exact tie the earlier post wins.
pub fn find_closest<N: PostNode>(posts: &[N], viewport_height: f64) -> Option<N> {
    let target = viewport_height / 2.0;
    let mut closest: Option<(&N, f64)> = None;

    for post in posts {
        let rect = match post.bounding_rect() {
            Ok(rect) => rect,
            Err(e) => {
                log::debug!("Skipping unmeasurable post: {}", e);
                continue;
            }
        };
        if rect.is_empty() {
            continue;
        }

        let distance = (target - rect.center_y()).abs();
        if closest.map_or(true, |(_, best)| distance < best) {
            closest = Some((post, distance));
        }
    }

    closest.map(|(post, _)| post.clone())
}
