//! Deterministic per-slot prompt text.
//!
//! The output depends only on the arguments, so re-running a slot yields the
//! same prompt unless the caller edits the base prompt.

use std::fmt::Write;

use crate::angle::{SLOT_COUNT, SlotOrdinal};
use crate::bundle::ReferenceBundle;

pub const REFERENCE_HEADER: &str = "REFERENCE IMAGE INSTRUCTIONS:";

const SUBJECT_DIRECTIVE: &str = "Subject: use subject character exactly as shown in the reference";
const STYLE_DIRECTIVE: &str = "Style: apply exact visual style of the style reference";
const SCENE_DIRECTIVE: &str = "Scene: use scene as environmental setting";
const EXTRAS_DIRECTIVE: &str = "Extras: reference additional images for composition";
const QUALITY_DIRECTIVES: [&str; 2] = [
    "Keep identity, proportions and colors consistent across every shot",
    "Render with high detail, sharp focus and coherent lighting",
];

/// Build the prompt for one slot of a job
pub fn compose(
    base_prompt: &str,
    bundle: &ReferenceBundle,
    project_id: &str,
    ordinal: SlotOrdinal,
) -> String {
    let mut out = String::with_capacity(base_prompt.len() + 512);
    out.push_str(base_prompt);

    if !bundle.is_empty() {
        out.push_str("\n\n");
        out.push_str(REFERENCE_HEADER);

        let directives = [
            (bundle.subject.is_some(), SUBJECT_DIRECTIVE),
            (bundle.style.is_some(), STYLE_DIRECTIVE),
            (bundle.scene.is_some(), SCENE_DIRECTIVE),
            (!bundle.extras().is_empty(), EXTRAS_DIRECTIVE),
        ];
        for (_, line) in directives.iter().filter(|(present, _)| *present) {
            let _ = write!(out, "\n- {line}");
        }
        for line in QUALITY_DIRECTIVES {
            let _ = write!(out, "\n- {line}");
        }
    }

    let _ = write!(
        out,
        "\n\n[Project {project_id} | Shot {ordinal}/{SLOT_COUNT}]\nCamera: {}",
        ordinal.angle().descriptor()
    );

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::angle::CameraAngle;

    fn ord(n: u8) -> SlotOrdinal {
        SlotOrdinal::new(n).unwrap()
    }

    #[test]
    fn test_empty_bundle_has_no_reference_block() {
        let prompt = compose("cat", &ReferenceBundle::new(), "guest-1-abcd", ord(1));
        assert!(prompt.starts_with("cat"));
        assert!(!prompt.contains(REFERENCE_HEADER));
        assert!(prompt.contains("guest-1-abcd"));
        assert!(prompt.contains("Shot 1/10"));
        assert!(prompt.ends_with(CameraAngle::WideEstablishing.descriptor()));
    }

    #[test]
    fn test_only_present_kinds_get_directives() {
        let bundle = ReferenceBundle::new().with_style("style.png");
        let prompt = compose("a castle", &bundle, "p", ord(4));

        assert!(prompt.contains(REFERENCE_HEADER));
        assert!(prompt.contains("apply exact visual style"));
        assert!(!prompt.contains("use subject character exactly as shown"));
        assert!(!prompt.contains("use scene as environmental setting"));
        assert!(!prompt.contains("reference additional images for composition"));
        for line in QUALITY_DIRECTIVES {
            assert!(prompt.contains(line));
        }
    }

    #[test]
    fn test_full_bundle_lists_directives_in_order() {
        let bundle = ReferenceBundle::new()
            .with_subject("s.png")
            .with_style("st.png")
            .with_scene("sc.png")
            .with_extra("x.png")
            .unwrap();
        let prompt = compose("hero", &bundle, "p", ord(10));

        let subject = prompt.find(SUBJECT_DIRECTIVE).unwrap();
        let style = prompt.find(STYLE_DIRECTIVE).unwrap();
        let scene = prompt.find(SCENE_DIRECTIVE).unwrap();
        let extras = prompt.find(EXTRAS_DIRECTIVE).unwrap();
        assert!(subject < style && style < scene && scene < extras);
        assert!(prompt.contains(CameraAngle::ExtremeCloseUp.descriptor()));
    }

    #[test]
    fn test_compose_is_deterministic() {
        let bundle = ReferenceBundle::new().with_subject("s.png");
        for ordinal in SlotOrdinal::all() {
            let a = compose("robot", &bundle, "wallet12-1700000000000-deadbeef", ordinal);
            let b = compose("robot", &bundle, "wallet12-1700000000000-deadbeef", ordinal);
            assert_eq!(a, b);
            assert!(a.contains(ordinal.angle().descriptor()));
        }
    }

    #[test]
    fn test_slots_differ_only_in_tag_and_angle() {
        let bundle = ReferenceBundle::new();
        let first = compose("cat", &bundle, "p", ord(1));
        let second = compose("cat", &bundle, "p", ord(2));
        assert_ne!(first, second);
        assert_eq!(
            first.split("[Project").next(),
            second.split("[Project").next()
        );
    }
}
