//! Logical structure for tagged output.
//!
//! Every laid-out line is wrapped in a marked-content sequence with its own
//! MCID. Lines of the same block become one structure element under a single
//! `/Document` element.

use lopdf::{Document, Object, ObjectId, dictionary};
use std::collections::BTreeMap;

struct BlockElement {
    role: &'static str,
    /// `(page index, mcid)` of each marked-content sequence.
    marks: Vec<(usize, i64)>,
}

#[derive(Default)]
pub(crate) struct StructureBuilder {
    blocks: BTreeMap<usize, BlockElement>,
    /// Per page, the block index owning each MCID.
    page_marks: Vec<Vec<usize>>,
}

impl StructureBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates the next MCID on `page` for a line of `block_index`.
    pub fn mark(&mut self, page: usize, block_index: usize, role: &'static str) -> i64 {
        if self.page_marks.len() <= page {
            self.page_marks.resize_with(page + 1, Vec::new);
        }
        let marks = &mut self.page_marks[page];
        let mcid = marks.len() as i64;
        marks.push(block_index);
        self.blocks
            .entry(block_index)
            .or_insert_with(|| BlockElement { role, marks: Vec::new() })
            .marks
            .push((page, mcid));
        mcid
    }

    /// Writes the structure tree and returns the id of its root.
    ///
    /// `page_ids[i]` must be the page whose `/StructParents` is `i`.
    pub fn write(self, doc: &mut Document, page_ids: &[ObjectId], lang: Option<&str>) -> ObjectId {
        let root_id = doc.new_object_id();
        let document_id = doc.new_object_id();

        let mut element_ids = BTreeMap::new();
        for (block_index, block) in &self.blocks {
            let kids: Vec<Object> = block
                .marks
                .iter()
                .map(|&(page, mcid)| {
                    Object::Dictionary(dictionary! {
                        "Type" => "MCR",
                        "Pg" => page_ids[page],
                        "MCID" => mcid,
                    })
                })
                .collect();
            let mut element = dictionary! {
                "Type" => "StructElem",
                "S" => block.role,
                "P" => document_id,
                "K" => kids,
            };
            if let Some(&(page, _)) = block.marks.first() {
                element.set("Pg", page_ids[page]);
            }
            element_ids.insert(*block_index, doc.add_object(element));
        }

        let mut document = dictionary! {
            "Type" => "StructElem",
            "S" => "Document",
            "P" => root_id,
            "K" => element_ids.values().map(|id| Object::Reference(*id)).collect::<Vec<_>>(),
        };
        if let Some(lang) = lang {
            document.set("Lang", Object::string_literal(lang));
        }
        doc.objects.insert(document_id, Object::Dictionary(document));

        let mut nums = Vec::new();
        for (page, owners) in self.page_marks.iter().enumerate() {
            let parents: Vec<Object> = owners
                .iter()
                .filter_map(|block_index| element_ids.get(block_index))
                .map(|id| Object::Reference(*id))
                .collect();
            nums.push(Object::Integer(page as i64));
            nums.push(Object::Array(parents));
        }
        let parent_tree_id = doc.add_object(dictionary! { "Nums" => nums });

        doc.objects.insert(
            root_id,
            Object::Dictionary(dictionary! {
                "Type" => "StructTreeRoot",
                "K" => document_id,
                "ParentTree" => parent_tree_id,
                "ParentTreeNextKey" => page_ids.len() as i64,
            }),
        );
        log::debug!("Wrote structure tree with {} element(s)", element_ids.len());
        root_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mcids_are_per_page() {
        let mut builder = StructureBuilder::new();
        assert_eq!(builder.mark(0, 0, "H1"), 0);
        assert_eq!(builder.mark(0, 1, "P"), 1);
        assert_eq!(builder.mark(1, 1, "P"), 0);
        assert_eq!(builder.mark(1, 2, "P"), 1);
        assert_eq!(builder.blocks[&1].marks, vec![(0, 1), (1, 0)]);
    }

    #[test]
    fn test_write_structure_tree() {
        let mut doc = Document::with_version("1.7");
        let pages = vec![doc.add_object(dictionary! {}), doc.add_object(dictionary! {})];
        let mut builder = StructureBuilder::new();
        builder.mark(0, 0, "H1");
        builder.mark(0, 1, "P");
        builder.mark(1, 1, "P");

        let root_id = builder.write(&mut doc, &pages, Some("en"));
        let root = doc.get_dictionary(root_id).unwrap();
        assert_eq!(root.get(b"Type").unwrap().as_name().unwrap(), b"StructTreeRoot");
        assert_eq!(root.get(b"ParentTreeNextKey").unwrap().as_i64().unwrap(), 2);

        let document_id = root.get(b"K").unwrap().as_reference().unwrap();
        let document = doc.get_dictionary(document_id).unwrap();
        assert_eq!(document.get(b"S").unwrap().as_name().unwrap(), b"Document");
        let kids = document.get(b"K").unwrap().as_array().unwrap();
        assert_eq!(kids.len(), 2);

        let paragraph = doc.get_dictionary(kids[1].as_reference().unwrap()).unwrap();
        assert_eq!(paragraph.get(b"S").unwrap().as_name().unwrap(), b"P");
        assert_eq!(paragraph.get(b"K").unwrap().as_array().unwrap().len(), 2);
    }
}
