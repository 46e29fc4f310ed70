//! Graph payloads shared by unit tests across the crate.

use crate::graph::payload::{EdgeEnvelope, GraphPayload, NodeEnvelope};

/// `chapters` chapters of `sections` sections each.
///
/// Display edges: chapter → each of its sections, chapter N → chapter N+1.
/// Dependent edges: chapter → first section, sections chained in order, last
/// section → `<N>_end`, `<N>_end` → first section of chapter N+1.
pub(crate) fn curriculum_payload(chapters: u32, sections: u32) -> GraphPayload {
    let mut nodes = Vec::new();
    let mut edges = Vec::new();
    let mut dependent_edges = Vec::new();

    for chapter in 1..=chapters {
        let chapter_id = format!("chapter{}", chapter);
        nodes.push(NodeEnvelope::new(&chapter_id, &format!("Chapter {}", chapter), Some("chapter")));
        dependent_edges.push(EdgeEnvelope::new(&chapter_id, &format!("{}_1", chapter)));

        for section in 1..=sections {
            let id = format!("{}_{}", chapter, section);
            nodes.push(NodeEnvelope::new(&id, &format!("Lesson {}", id), Some("knowledge")));
            edges.push(EdgeEnvelope::new(&chapter_id, &id));
            if section > 1 {
                dependent_edges.push(EdgeEnvelope::new(&format!("{}_{}", chapter, section - 1), &id));
            }
        }
        dependent_edges.push(EdgeEnvelope::new(
            &format!("{}_{}", chapter, sections),
            &format!("{}_end", chapter),
        ));

        if chapter < chapters {
            edges.push(EdgeEnvelope::new(&chapter_id, &format!("chapter{}", chapter + 1)));
            dependent_edges.push(EdgeEnvelope::new(
                &format!("{}_end", chapter),
                &format!("{}_1", chapter + 1),
            ));
        }
    }

    GraphPayload { nodes, edges, dependent_edges }
}

/// Two chapters of three sections: 1_1→1_2→1_3→1_end→2_1→2_2→2_3→2_end
pub(crate) fn two_chapter_payload() -> GraphPayload {
    curriculum_payload(2, 3)
}
