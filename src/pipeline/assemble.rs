use std::collections::{HashMap, HashSet, VecDeque};

use tracing::{debug, info, instrument};

use super::normalize::{coerce_bool, coerce_int, normalize_date};
use crate::config::{JoinPolicy, Relation, RelationPolicies};
use crate::constants::columns;
use crate::domain::{BiographyEntry, Collaborator, Minister, Ministry, PersonRole};
use crate::error::Result;
use crate::types::{Row, SourceTables, Table};

/// A row dropped because its foreign key matched nothing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedLink {
    pub relation: Relation,
    pub table: String,
    pub line: usize,
    pub reference: String,
}

/// Assembler output: ministers in first-seen person order, collections unsorted
#[derive(Debug, Clone, Default)]
pub struct Assembly {
    pub ministers: Vec<Minister>,
    /// Dropped rows of relations configured with [`JoinPolicy::Validate`]
    pub unresolved: Vec<UnresolvedLink>,
    /// Ids carried by both a minister and a non-minister person row
    pub shared_ids: Vec<String>,
}

pub struct Assembler<'a> {
    policies: &'a RelationPolicies,
    ministers: Vec<Minister>,
    /// Minister id to the position of its first record
    index: HashMap<String, usize>,
    /// Known persons that are not ministers (collaborators, unknown roles)
    others: HashSet<String>,
    unresolved: Vec<UnresolvedLink>,
    shared_ids: Vec<String>,
}

impl<'a> Assembler<'a> {
    pub fn new(policies: &'a RelationPolicies) -> Self {
        Self {
            policies,
            ministers: Vec::new(),
            index: HashMap::new(),
            others: HashSet::new(),
            unresolved: Vec::new(),
            shared_ids: Vec::new(),
        }
    }

    /// Run every fold in order: seed, ministries, biography, collaborators, delegates
    #[instrument(skip_all)]
    pub fn assemble(tables: &SourceTables, policies: &RelationPolicies) -> Result<Assembly> {
        let mut assembler = Assembler::new(policies);
        assembler.seed(&tables.persons);
        assembler.fold_ministries(&tables.ministries, &tables.person_ministries);
        assembler.fold_biography(&tables.careers)?;
        assembler.fold_collaborators(&tables.persons, &tables.collaborators)?;
        assembler.fold_delegates(&tables.delegates);
        Ok(assembler.finish())
    }

    pub fn finish(self) -> Assembly {
        info!(
            ministers = self.ministers.len(),
            unresolved = self.unresolved.len(),
            "Assembly complete"
        );
        Assembly {
            ministers: self.ministers,
            unresolved: self.unresolved,
            shared_ids: self.shared_ids,
        }
    }

    /// One Minister per person row with an office-holder role.
    ///
    /// A repeated id still gets its own record so validation can report it;
    /// joins attach to the first one. An id also used by a non-minister row
    /// is recorded in `shared_ids`.
    pub fn seed(&mut self, persons: &Table) {
        for row in &persons.rows {
            let id = row.text_or_empty(columns::ID);
            let role = PersonRole::parse(&row.text_or_empty(columns::ROLE));
            let Some(output_role) = role.output_role() else {
                if let PersonRole::Other(tag) = &role {
                    debug!(id = %id, role = %tag, "Ignoring person with unknown role");
                }
                if self.index.contains_key(&id) {
                    self.note_shared(&id);
                }
                self.others.insert(id);
                continue;
            };

            if self.others.contains(&id) {
                self.note_shared(&id);
            }
            self.index.entry(id.clone()).or_insert(self.ministers.len());
            self.ministers.push(Minister {
                id,
                name: row.text_or_empty(columns::NAME),
                role: output_role.to_string(),
                email: row.text_or_empty(columns::EMAIL),
                party: row.text_or_empty(columns::PARTY),
                photo: row.text_or_empty(columns::PHOTO),
                portfolio: row.text_or_empty(columns::PORTFOLIO),
                description: row.text_or_empty(columns::DESCRIPTION),
                superior_id: row.text(columns::SUPERIOR_ID),
                ministries: Vec::new(),
                biography: Vec::new(),
                collaborators: Vec::new(),
                delegates: Vec::new(),
            });
        }
    }

    /// Attach ministries through the person-ministry links.
    /// The last primary link processed sets the portfolio.
    pub fn fold_ministries(&mut self, ministries: &Table, links: &Table) {
        // Last write wins per ministry id
        let by_id: HashMap<String, &Row> = ministries
            .rows
            .iter()
            .map(|row| (row.text_or_empty(columns::ID), row))
            .collect();

        for link in &links.rows {
            let person_id = link.text_or_empty(columns::PERSON_ID);
            let ministry_id = link.text_or_empty(columns::MINISTRY_ID);
            let Some(&position) = self.index.get(&person_id) else {
                if !self.others.contains(&person_id) {
                    self.drop_row(Relation::Ministries, links, link, person_id);
                }
                continue;
            };
            let Some(ministry) = by_id.get(&ministry_id) else {
                self.drop_row(Relation::Ministries, links, link, ministry_id);
                continue;
            };

            let is_primary = coerce_bool(link.get(columns::IS_PRIMARY), false);
            let short_name = ministry.text_or_empty(columns::SHORT_NAME);
            let minister = &mut self.ministers[position];
            if is_primary {
                minister.portfolio = short_name.clone();
            }
            minister.ministries.push(Ministry {
                id: ministry_id,
                name: ministry.text_or_empty(columns::NAME),
                short_name,
                color: ministry.text_or_empty(columns::COLOR),
                is_primary,
                role_label: link.text_or_empty(columns::ROLE_LABEL),
            });
        }
    }

    pub fn fold_biography(&mut self, careers: &Table) -> Result<()> {
        for row in &careers.rows {
            let person_id = row.text_or_empty(columns::MINISTER_ID);
            let Some(&position) = self.index.get(&person_id) else {
                if !self.others.contains(&person_id) {
                    self.drop_row(Relation::Biography, careers, row, person_id);
                }
                continue;
            };

            let entry = BiographyEntry {
                title: row.text_or_empty(columns::TITLE),
                organization: row.text_or_empty(columns::ORGANIZATION),
                bio_section: row.text_or_empty(columns::BIO_SECTION),
                start_date: normalize_date(row.text(columns::START_DATE)),
                end_date: normalize_date(row.text(columns::END_DATE)),
                event_date: normalize_date(row.text(columns::EVENT_DATE)),
                event_text: row.text(columns::EVENT_TEXT),
                ongoing: coerce_bool(row.get(columns::ONGOING), false),
                sort_index: coerce_int(row, &careers.name, columns::SORT_INDEX)?,
            };
            self.ministers[position].biography.push(entry);
        }
        Ok(())
    }

    /// Collaborators come from collaborator-role person rows, then from the
    /// dedicated table.
    ///
    /// A collaborator belongs to the minister at the top of its superior
    /// chain, so an advisor reporting to a chief of staff lands under the
    /// chief's minister. Each minister's tree is walked breadth-first. A
    /// missing superior is not a dangling reference.
    pub fn fold_collaborators(&mut self, persons: &Table, collaborators: &Table) -> Result<()> {
        let person_rows = persons
            .rows
            .iter()
            .filter(|row| {
                PersonRole::parse(&row.text_or_empty(columns::ROLE)) == PersonRole::Collaborator
            })
            .map(|row| (persons, row));
        let table_rows = collaborators.rows.iter().map(|row| (collaborators, row));

        let mut sources = Vec::new();
        let mut pending = Vec::new();
        for (table, row) in person_rows.chain(table_rows) {
            let Some(superior_id) = row.text(columns::SUPERIOR_ID) else {
                debug!(table = %table.name, line = row.line, "Collaborator without superior dropped");
                continue;
            };
            pending.push(Some(collaborator(table, row, superior_id)?));
            sources.push((table, row));
        }

        let placements = self.place_collaborators(&pending);
        for (position, slot) in placements {
            if let Some(collaborator) = pending[slot].take() {
                self.ministers[position].collaborators.push(collaborator);
            }
        }
        for ((table, row), leftover) in sources.into_iter().zip(pending) {
            if let Some(collaborator) = leftover {
                self.drop_row(Relation::Collaborators, table, row, collaborator.superior_id);
            }
        }
        Ok(())
    }

    /// Pairs of (minister position, pending slot) in breadth-first order
    fn place_collaborators(&self, pending: &[Option<Collaborator>]) -> Vec<(usize, usize)> {
        let mut children: HashMap<&str, Vec<usize>> = HashMap::new();
        for (slot, collaborator) in pending.iter().enumerate() {
            if let Some(collaborator) = collaborator {
                children
                    .entry(collaborator.superior_id.as_str())
                    .or_default()
                    .push(slot);
            }
        }

        let mut placed = vec![false; pending.len()];
        let mut placements = Vec::new();
        for (position, minister) in self.ministers.iter().enumerate() {
            if self.index.get(&minister.id) != Some(&position) {
                continue;
            }
            let mut queue = VecDeque::from([minister.id.as_str()]);
            let mut visited = HashSet::new();
            while let Some(current) = queue.pop_front() {
                if !visited.insert(current) {
                    continue;
                }
                for &slot in children.get(current).into_iter().flatten() {
                    if placed[slot] {
                        continue;
                    }
                    placed[slot] = true;
                    placements.push((position, slot));
                    if let Some(collaborator) = &pending[slot] {
                        // Another minister's id heads its own tree
                        if !collaborator.id.is_empty() && !self.index.contains_key(&collaborator.id) {
                            queue.push_back(collaborator.id.as_str());
                        }
                    }
                }
            }
        }
        placements
    }

    /// Delegate ids are attached unchecked; the validator resolves them.
    pub fn fold_delegates(&mut self, delegates: &Table) {
        for row in &delegates.rows {
            let minister_id = row.text_or_empty(columns::MINISTER_ID);
            let delegate_id = row.text_or_empty(columns::DELEGATE_ID);
            match self.index.get(&minister_id) {
                Some(&position) => self.ministers[position].delegates.push(delegate_id),
                None => debug!(
                    line = row.line,
                    minister_id = %minister_id,
                    "Delegate link for unknown minister dropped"
                ),
            }
        }
    }

    fn note_shared(&mut self, id: &str) {
        if !self.shared_ids.iter().any(|shared| shared == id) {
            debug!(id = %id, "Person id used by a minister and a non-minister");
            self.shared_ids.push(id.to_string());
        }
    }

    fn drop_row(&mut self, relation: Relation, table: &Table, row: &Row, reference: String) {
        debug!(
            relation = %relation,
            table = %table.name,
            line = row.line,
            reference = %reference,
            "Row references no known minister or ministry, dropped"
        );
        if self.policies.policy(relation) == JoinPolicy::Validate {
            self.unresolved.push(UnresolvedLink {
                relation,
                table: table.name.clone(),
                line: row.line,
                reference,
            });
        }
    }
}

fn collaborator(table: &Table, row: &Row, superior_id: String) -> Result<Collaborator> {
    let job_title = row.text(columns::JOB_TITLE);
    Ok(Collaborator {
        id: row.text_or_empty(columns::ID),
        name: row.text_or_empty(columns::NAME),
        full_name: row.text_or_empty(columns::FULL_NAME),
        superior_id,
        cabinet_role: row.text(columns::CABINET_ROLE).or_else(|| job_title.clone()),
        job_title,
        cabinet_order: coerce_int(row, &table.name, columns::CABINET_ORDER)?,
        cabinet_badge: row.text(columns::CABINET_BADGE),
        collab_grade: row.text(columns::COLLAB_GRADE),
        pole_name: row.text(columns::POLE_NAME),
        photo_url: row.text(columns::PHOTO_URL),
        description: row.text(columns::DESCRIPTION),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use serde_json::{json, Value};

    fn table(name: &str, rows: Value) -> Table {
        let rows = rows
            .as_array()
            .unwrap()
            .iter()
            .enumerate()
            .map(|(i, r)| {
                let values: IndexMap<String, Value> = r
                    .as_object()
                    .unwrap()
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect();
                Row::new(i + 1, values)
            })
            .collect();
        Table::new(name, rows)
    }

    fn tables() -> SourceTables {
        SourceTables {
            persons: table(
                "persons",
                json!([
                    {"id": "m1", "full_name": "Alice", "role": "minister"},
                    {"id": "m2", "full_name": "Bruno", "role": "minister-delegate", "superior_id": "m1"},
                    {"id": "c1", "full_name": "Chloé", "role": "collaborator", "superior_id": "m1",
                     "cabinet_order": "2", "job_title": "Directrice de cabinet"},
                    {"id": "c2", "full_name": "Orphan", "role": "collaborator", "superior_id": "nobody"},
                    {"id": "c3", "full_name": "Loose", "role": "collaborator"}
                ]),
            ),
            ministries: table(
                "ministries",
                json!([
                    {"id": "j", "name": "Ministère de la Justice", "short_name": "Justice", "color": "#a00"},
                    {"id": "i", "name": "Ministère de l'Intérieur", "short_name": "Intérieur", "color": "#00a"}
                ]),
            ),
            person_ministries: table(
                "person_ministries",
                json!([
                    {"person_id": "m1", "ministry_id": "j", "is_primary": "TRUE", "role_label": "Ministre"},
                    {"person_id": "m1", "ministry_id": "i", "is_primary": "false"},
                    {"person_id": "ghost", "ministry_id": "j", "is_primary": "TRUE"},
                    {"person_id": "m2", "ministry_id": "unknown", "is_primary": "TRUE"},
                    {"person_id": "c1", "ministry_id": "j", "role_label": "Cabinet"}
                ]),
            ),
            careers: table(
                "person_careers",
                json!([
                    {"person_id": "m1", "title": "X", "sort_index": "2", "ongoing": "TRUE"},
                    {"person_id": "m1", "title": "Y", "sort_index": "1"},
                    {"person_id": "ghost", "title": "Z", "sort_index": "0"}
                ]),
            ),
            collaborators: Table::empty("collaborators"),
            delegates: table(
                "delegates",
                json!([
                    {"ministerId": "m1", "delegateId": "m2"},
                    {"ministerId": "ghost", "delegateId": "m1"}
                ]),
            ),
        }
    }

    #[test]
    fn test_seed_keeps_person_order_and_normalizes_role() {
        let assembly = Assembler::assemble(&tables(), &RelationPolicies::default()).unwrap();
        let ids: Vec<&str> = assembly.ministers.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["m1", "m2"]);
        assert!(assembly.ministers.iter().all(|m| m.role == "minister"));
        assert_eq!(assembly.ministers[1].superior_id.as_deref(), Some("m1"));
        assert_eq!(assembly.ministers[0].name, "Alice");
    }

    #[test]
    fn test_ministries_fold_sets_primary_portfolio() {
        let assembly = Assembler::assemble(&tables(), &RelationPolicies::default()).unwrap();
        let m1 = &assembly.ministers[0];
        assert_eq!(m1.portfolio, "Justice");
        assert_eq!(m1.ministries.len(), 2);
        assert!(m1.ministries[0].is_primary);
        assert_eq!(m1.ministries[0].role_label, "Ministre");
        assert!(!m1.ministries[1].is_primary);
        // Unknown ministry id: dropped, portfolio untouched
        assert!(assembly.ministers[1].ministries.is_empty());
        assert_eq!(assembly.ministers[1].portfolio, "");
        assert!(assembly.unresolved.is_empty());
    }

    #[test]
    fn test_last_primary_link_wins() {
        let mut t = tables();
        t.person_ministries = table(
            "person_ministries",
            json!([
                {"person_id": "m1", "ministry_id": "j", "is_primary": "TRUE"},
                {"person_id": "m1", "ministry_id": "i", "is_primary": "true"}
            ]),
        );
        let assembly = Assembler::assemble(&t, &RelationPolicies::default()).unwrap();
        assert_eq!(assembly.ministers[0].portfolio, "Intérieur");
    }

    #[test]
    fn test_biography_fold_coerces_fields() {
        let assembly = Assembler::assemble(&tables(), &RelationPolicies::default()).unwrap();
        let bio = &assembly.ministers[0].biography;
        assert_eq!(bio.len(), 2);
        assert_eq!(bio[0].title, "X");
        assert_eq!(bio[0].sort_index, 2);
        assert!(bio[0].ongoing);
        assert!(!bio[1].ongoing);
    }

    #[test]
    fn test_collaborators_attach_to_known_superior_only() {
        let assembly = Assembler::assemble(&tables(), &RelationPolicies::default()).unwrap();
        let collaborators = &assembly.ministers[0].collaborators;
        assert_eq!(collaborators.len(), 1);
        assert_eq!(collaborators[0].id, "c1");
        assert_eq!(collaborators[0].name, "Chloé");
        assert_eq!(collaborators[0].full_name, "Chloé");
        assert_eq!(collaborators[0].cabinet_order, 2);
        assert_eq!(collaborators[0].job_title.as_deref(), Some("Directrice de cabinet"));
        // No cabinet_role column: the job title stands in
        assert_eq!(collaborators[0].cabinet_role.as_deref(), Some("Directrice de cabinet"));
        assert!(assembly.ministers[1].collaborators.is_empty());
    }

    #[test]
    fn test_collaborator_chain_resolves_to_minister() {
        let mut t = tables();
        t.persons = table(
            "persons",
            json!([
                {"id": "m1", "full_name": "Alice", "role": "minister"},
                {"id": "c1", "full_name": "Chef de cabinet", "role": "collaborator", "superior_id": "m1",
                 "cabinet_role": "Directeur"},
                {"id": "c2", "full_name": "Conseiller", "role": "collaborator", "superior_id": "c1"},
                {"id": "c3", "full_name": "Stagiaire", "role": "collaborator", "superior_id": "c2"},
                {"id": "c4", "full_name": "Adjointe", "role": "collaborator", "superior_id": "m1"},
                {"id": "x1", "full_name": "Loop A", "role": "collaborator", "superior_id": "x2"},
                {"id": "x2", "full_name": "Loop B", "role": "collaborator", "superior_id": "x1"}
            ]),
        );
        let policies = RelationPolicies {
            collaborators: JoinPolicy::Validate,
            ..RelationPolicies::default()
        };
        let assembly = Assembler::assemble(&t, &policies).unwrap();

        let m1 = &assembly.ministers[0];
        let ids: Vec<&str> = m1.collaborators.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["c1", "c4", "c2", "c3"]);
        assert_eq!(m1.collaborators[0].cabinet_role.as_deref(), Some("Directeur"));
        // The direct superior is kept on the record
        assert_eq!(m1.collaborators[2].superior_id, "c1");

        let loose: Vec<&str> = assembly
            .unresolved
            .iter()
            .filter(|u| u.relation == Relation::Collaborators)
            .map(|u| u.reference.as_str())
            .collect();
        assert_eq!(loose, ["x2", "x1"]);
    }

    #[test]
    fn test_collaborator_sharing_minister_id_keeps_joins() {
        let mut t = tables();
        t.persons = table(
            "persons",
            json!([
                {"id": "m1", "full_name": "Alice", "role": "minister"},
                {"id": "m1", "full_name": "Homonyme", "role": "collaborator", "superior_id": "m1"},
                {"id": "c9", "full_name": "Other", "role": "observer"}
            ]),
        );
        let assembly = Assembler::assemble(&t, &RelationPolicies::default()).unwrap();

        let m1 = &assembly.ministers[0];
        assert_eq!(m1.ministries.len(), 2);
        assert_eq!(m1.biography.len(), 2);
        assert_eq!(assembly.shared_ids, ["m1"]);
    }

    #[test]
    fn test_delegates_are_attached_unchecked() {
        let assembly = Assembler::assemble(&tables(), &RelationPolicies::default()).unwrap();
        assert_eq!(assembly.ministers[0].delegates, ["m2"]);
        assert!(assembly.ministers[1].delegates.is_empty());
    }

    #[test]
    fn test_validate_policy_records_dropped_rows() {
        let policies = RelationPolicies {
            ministries: JoinPolicy::Validate,
            biography: JoinPolicy::Validate,
            collaborators: JoinPolicy::Validate,
            delegates: JoinPolicy::Validate,
        };
        let assembly = Assembler::assemble(&tables(), &policies).unwrap();
        let refs: Vec<(Relation, &str)> = assembly
            .unresolved
            .iter()
            .map(|u| (u.relation, u.reference.as_str()))
            .collect();
        // The collaborator's own "Cabinet" link is not a dangling reference
        assert_eq!(
            refs,
            [
                (Relation::Ministries, "ghost"),
                (Relation::Ministries, "unknown"),
                (Relation::Biography, "ghost"),
                (Relation::Collaborators, "nobody"),
            ]
        );
    }

    #[test]
    fn test_duplicate_ids_keep_both_records() {
        let mut t = tables();
        t.persons = table(
            "persons",
            json!([
                {"id": "m1", "full_name": "Alice", "role": "minister"},
                {"id": "m1", "full_name": "Alice bis", "role": "minister"}
            ]),
        );
        let assembly = Assembler::assemble(&t, &RelationPolicies::default()).unwrap();
        assert_eq!(assembly.ministers.len(), 2);
        assert_eq!(assembly.ministers[0].biography.len(), 2);
        assert!(assembly.ministers[1].biography.is_empty());
    }

    #[test]
    fn test_malformed_sort_index_fails() {
        let mut t = tables();
        t.careers = table(
            "person_careers",
            json!([{"person_id": "m1", "title": "X", "sort_index": "first"}]),
        );
        assert!(Assembler::assemble(&t, &RelationPolicies::default()).is_err());
    }
}
