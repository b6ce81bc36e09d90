//! Built-in seed corpus
//!
//! Loaded into every new [`DocumentStore`](crate::rag::DocumentStore) and
//! restored on `clear`.

use crate::rag::document::{Document, DocumentMetadata, GENERAL_CATEGORY};

const SOURCE: &str = "Growth Program Handbook";

fn doc(id: &str, title: &str, agent_id: &str, category: &str, tags: &[&str], content: &str) -> Document {
    Document::new(
        id,
        content,
        DocumentMetadata::titled(title)
            .with_agent(agent_id)
            .with_category(category)
            .with_tags(tags.iter().copied())
            .with_source(SOURCE),
    )
}

/// The fixed seed documents, in their defined order
pub fn default_corpus() -> Vec<Document> {
    vec![
        doc(
            "program-overview",
            "Growth Program - Overview",
            "strategist",
            "program",
            &["program", "marketing", "sales"],
            "The Growth Program is an intensive three-day course on digital marketing and sales.\n\
             Day 1 covers fundamentals and positioning, day 2 content strategy and copywriting,\n\
             day 3 sales funnels and conversion. It includes three live classes, supporting\n\
             material, a private community group, exclusive bonuses and a certificate.",
        ),
        doc(
            "day-1-positioning",
            "Day 1 - Fundamentals and Positioning",
            "strategist",
            "lesson",
            &["day-1", "fundamentals", "positioning"],
            "Day one lays the foundations: choosing a niche and a position, competitor analysis,\n\
             building a detailed customer persona, differentiation strategies, copywriting basics\n\
             and structuring an irresistible offer. Exercises include a positioning workshop and\n\
             a personal SWOT analysis.",
        ),
        doc(
            "day-2-copywriting",
            "Day 2 - Content Strategy and Copywriting",
            "strategist",
            "lesson",
            &["day-2", "copywriting", "content"],
            "Day two is about content and advanced copywriting: the AIDA, PAS and\n\
             Before/After/Bridge frameworks, magnetic headlines, storytelling for sales,\n\
             persuasion triggers, sales email structure and copy for social networks.",
        ),
        doc(
            "day-3-funnels",
            "Day 3 - Sales Funnels and Conversion",
            "strategist",
            "lesson",
            &["day-3", "funnels", "conversion"],
            "Day three builds effective sales funnels: funnel architecture, high-converting\n\
             capture pages, email marketing sequences, strategic upsells and downsells,\n\
             metrics and optimisation, and sales automation.",
        ),
        doc(
            "pricing-details",
            "Pricing and Guarantee",
            "sales",
            "commercial",
            &["pricing", "payment", "guarantee"],
            "Promotional price 497, regular price 997, a 50% discount. Payment up front or in\n\
             twelve card instalments of 49.70. Seven-day unconditional money-back guarantee.\n\
             Bonuses: a headline swipe file, a funnel template, a metrics spreadsheet and\n\
             thirty days of community access.",
        ),
        doc(
            "awareness-levels",
            "Awareness Levels Framework",
            "brand",
            "strategy",
            &["framework", "awareness", "funnel"],
            "Problem aware: the customer knows the pain but not that a solution exists; educate\n\
             about the problem. Solution aware: the customer knows solutions exist but not your\n\
             product; compare approaches. Product aware: the customer knows your product and\n\
             needs convincing; use demos, case studies and direct comparisons. Proof content\n\
             shows competence through real results, testimonials and social proof.",
        ),
        doc(
            "support-hours",
            "Support and Contact",
            "strategist",
            GENERAL_CATEGORY,
            &["support", "contact"],
            "Support is available on business days from 9am to 6pm through the community group\n\
             and by email. Replies are sent within one business day.",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_seed_ids_are_unique() {
        let corpus = default_corpus();
        let ids: HashSet<_> = corpus.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids.len(), corpus.len());
    }

    #[test]
    fn test_seed_is_unembedded_and_titled() {
        for doc in default_corpus() {
            assert!(!doc.has_embedding());
            assert!(doc.metadata.title.is_some());
        }
    }
}
