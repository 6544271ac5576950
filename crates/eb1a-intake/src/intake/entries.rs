use tracing::debug;

use super::domain::{Criterion, EntryDraft, EntryId, EntryRecord};
use super::form::FormError;
use super::schema::{schema_for, CriterionSchema};

/// Ordered collection of entries for a single criterion.
///
/// Every mutation validates against the criterion schema first, so a failed
/// call leaves the collection untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CriterionEntries {
    criterion: Criterion,
    entries: Vec<EntryRecord>,
}

impl CriterionEntries {
    pub fn new(criterion: Criterion) -> Self {
        Self::from_entries(criterion, Vec::new())
    }

    pub fn from_entries(criterion: Criterion, entries: Vec<EntryRecord>) -> Self {
        Self { criterion, entries }
    }

    pub fn criterion(&self) -> Criterion {
        self.criterion
    }

    pub fn schema(&self) -> &'static CriterionSchema {
        schema_for(self.criterion)
    }

    /// Entries in insertion order.
    pub fn list(&self) -> &[EntryRecord] {
        &self.entries
    }

    pub fn get(&self, id: &EntryId) -> Option<&EntryRecord> {
        self.entries.iter().find(|entry| &entry.id == id)
    }

    pub fn into_entries(self) -> Vec<EntryRecord> {
        self.entries
    }

    /// Appends a new entry with a freshly generated id.
    pub fn add(&mut self, draft: EntryDraft) -> Result<&[EntryRecord], FormError> {
        self.validate(&draft)?;

        let mut id = EntryId::generate();
        while self.get(&id).is_some() {
            id = EntryId::generate();
        }

        self.entries.push(EntryRecord {
            id,
            fields: draft.fields,
            attachments: draft.attachments,
        });
        Ok(&self.entries)
    }

    /// Replaces the field values of the matching entry in place. Attachments
    /// carried by the draft are set; other attachments are kept. The draft is
    /// validated before the id lookup, so an incomplete draft is rejected even
    /// for an unknown id; a complete draft with an unknown id is a no-op.
    pub fn edit(&mut self, id: &EntryId, draft: EntryDraft) -> Result<&[EntryRecord], FormError> {
        self.validate(&draft)?;

        match self.entries.iter_mut().find(|entry| &entry.id == id) {
            Some(entry) => {
                entry.fields = draft.fields;
                entry.attachments.extend(draft.attachments);
            }
            None => debug!(criterion = %self.criterion, entry_id = %id, "edit ignored for unknown entry"),
        }
        Ok(&self.entries)
    }

    /// Drops the matching entry; absent ids are a no-op.
    pub fn remove(&mut self, id: &EntryId) -> &[EntryRecord] {
        self.entries.retain(|entry| &entry.id != id);
        &self.entries
    }

    /// Points one attachment slot of an entry at an uploaded file.
    pub fn attach(
        &mut self,
        id: &EntryId,
        field: &str,
        url: impl Into<String>,
    ) -> Result<&[EntryRecord], FormError> {
        let slot = self.schema().validate_attachment(field)?;
        let entry = self.entry_mut(id)?;
        entry.attachments.insert(slot.key.to_string(), url.into());
        Ok(&self.entries)
    }

    /// Clears one attachment slot of an entry.
    pub fn detach(&mut self, id: &EntryId, field: &str) -> Result<&[EntryRecord], FormError> {
        let slot = self.schema().validate_attachment(field)?;
        let entry = self.entry_mut(id)?;
        entry.attachments.remove(slot.key);
        Ok(&self.entries)
    }

    fn validate(&self, draft: &EntryDraft) -> Result<(), FormError> {
        let schema = self.schema();
        schema.validate_fields(&draft.fields)?;
        for key in draft.attachments.keys() {
            schema.validate_attachment(key)?;
        }
        Ok(())
    }

    fn entry_mut(&mut self, id: &EntryId) -> Result<&mut EntryRecord, FormError> {
        let criterion = self.criterion;
        self.entries
            .iter_mut()
            .find(|entry| &entry.id == id)
            .ok_or_else(|| FormError::EntryNotFound {
                criterion,
                entry_id: id.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn award(name: &str) -> EntryDraft {
        EntryDraft::from_fields([
            ("awardName", name),
            ("dateReceived", "2021-05-01"),
            ("awardingOrganization", "ACM"),
        ])
    }

    #[test]
    fn add_appends_in_insertion_order() {
        let mut awards = CriterionEntries::new(Criterion::Awards);
        awards.add(award("Turing")).expect("first add");
        let list = awards.add(award("Gödel")).expect("second add");

        assert_eq!(list.len(), 2);
        assert_eq!(list[0].field("awardName"), Some("Turing"));
        assert_eq!(list[1].field("awardName"), Some("Gödel"));
        assert_ne!(list[0].id, list[1].id);
    }

    #[test]
    fn add_with_missing_required_field_does_not_mutate() {
        let mut awards = CriterionEntries::new(Criterion::Awards);
        let draft = EntryDraft::from_fields([("awardName", "Turing")]);

        assert!(matches!(
            awards.add(draft),
            Err(FormError::MissingRequiredFields { .. })
        ));
        assert!(awards.list().is_empty());
    }

    #[test]
    fn edit_keeps_position_id_and_attachments() {
        let mut awards = CriterionEntries::new(Criterion::Awards);
        awards
            .add(award("Turing").with_attachment("certificateUrl", "https://files/cert.pdf"))
            .expect("add");
        awards.add(award("Gödel")).expect("add");
        let first = awards.list()[0].id.clone();

        let list = awards.edit(&first, award("Turing Award")).expect("edit");

        assert_eq!(list[0].id, first);
        assert_eq!(list[0].field("awardName"), Some("Turing Award"));
        assert_eq!(list[0].attachment("certificateUrl"), Some("https://files/cert.pdf"));
        assert_eq!(list[1].field("awardName"), Some("Gödel"));
    }

    #[test]
    fn edit_of_unknown_id_is_a_no_op() {
        let mut awards = CriterionEntries::new(Criterion::Awards);
        awards.add(award("Turing")).expect("add");
        let before = awards.clone();

        awards
            .edit(&EntryId("missing".to_string()), award("Other"))
            .expect("no-op edit succeeds");

        assert_eq!(awards, before);
    }

    #[test]
    fn edit_validates_before_looking_up_the_id() {
        let mut awards = CriterionEntries::new(Criterion::Awards);
        awards.add(award("Turing")).expect("add");
        let before = awards.clone();

        let incomplete = EntryDraft::from_fields([("awardName", "Other")]);
        assert!(matches!(
            awards.edit(&EntryId("missing".to_string()), incomplete),
            Err(FormError::MissingRequiredFields { .. })
        ));
        assert_eq!(awards, before);
    }

    #[test]
    fn remove_only_drops_matching_entry() {
        let mut awards = CriterionEntries::new(Criterion::Awards);
        awards.add(award("A")).expect("add");
        awards.add(award("B")).expect("add");
        let target = awards.list()[0].id.clone();

        assert_eq!(awards.remove(&EntryId("nope".to_string())).len(), 2);
        let list = awards.remove(&target);
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].field("awardName"), Some("B"));
    }

    #[test]
    fn attach_and_detach_touch_only_one_slot() {
        let mut awards = CriterionEntries::new(Criterion::Awards);
        awards
            .add(award("Turing").with_attachment("supportingDocUrl", "https://files/doc.pdf"))
            .expect("add");
        let id = awards.list()[0].id.clone();

        awards
            .attach(&id, "certificateUrl", "https://files/cert.pdf")
            .expect("attach");
        let entry = awards.get(&id).expect("entry");
        assert_eq!(entry.attachment("certificateUrl"), Some("https://files/cert.pdf"));
        assert_eq!(entry.attachment("supportingDocUrl"), Some("https://files/doc.pdf"));

        awards.detach(&id, "certificateUrl").expect("detach");
        let entry = awards.get(&id).expect("entry");
        assert_eq!(entry.attachment("certificateUrl"), None);
        assert_eq!(entry.attachment("supportingDocUrl"), Some("https://files/doc.pdf"));
    }

    #[test]
    fn attach_rejects_unknown_slot_and_entry() {
        let mut awards = CriterionEntries::new(Criterion::Awards);
        awards.add(award("Turing")).expect("add");
        let id = awards.list()[0].id.clone();

        assert!(matches!(
            awards.attach(&id, "articleUrl", "https://files/a.pdf"),
            Err(FormError::UnknownAttachment { .. })
        ));
        assert!(matches!(
            awards.attach(&EntryId("ghost".to_string()), "certificateUrl", "u"),
            Err(FormError::EntryNotFound { .. })
        ));
    }
}
