// store.rs
// In-memory mirrors of the remote tables. Writes go to MongoDB first and are applied
// to the mirror only after the remote call succeeds.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{Context, Result, bail};
use futures::stream::TryStreamExt;
use mongodb::{
    Collection,
    bson::{doc, oid::ObjectId},
};
use serde::{Serialize, de::DeserializeOwned};

/// A row of a named remote table.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + Unpin + 'static {
    const TABLE: &'static str;

    fn id(&self) -> Option<ObjectId>;
    fn set_id(&mut self, id: ObjectId);
}

#[derive(Debug, Clone, PartialEq)]
pub enum Mutation<T> {
    Create(T),
    Update(ObjectId, T),
    Delete(ObjectId),
}

impl<T> Mutation<T> {
    pub fn kind(&self) -> &'static str {
        match self {
            Mutation::Create(_) => "create",
            Mutation::Update(..) => "update",
            Mutation::Delete(_) => "delete",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Mirror<T> {
    rows: Vec<T>,
    applied: u64,
}

impl<T> Default for Mirror<T> {
    fn default() -> Self {
        Mirror {
            rows: Vec::new(),
            applied: 0,
        }
    }
}

impl<T: Record> Mirror<T> {
    pub fn load(&mut self, rows: Vec<T>) {
        self.rows = rows;
    }

    /// Applies a typed mutation. Updating an unknown id inserts it; deleting one is a no-op.
    pub fn apply(&mut self, mutation: Mutation<T>) {
        let target = match &mutation {
            Mutation::Create(row) => row.id(),
            Mutation::Update(id, _) | Mutation::Delete(id) => Some(*id),
        };
        tracing::debug!(
            table = T::TABLE,
            kind = mutation.kind(),
            id = ?target.map(|id| id.to_hex()),
            "mirror mutation"
        );
        match mutation {
            Mutation::Create(row) => match row.id().and_then(|id| self.position(&id)) {
                Some(idx) => self.rows[idx] = row,
                None => self.rows.push(row),
            },
            Mutation::Update(id, mut row) => {
                row.set_id(id);
                match self.position(&id) {
                    Some(idx) => self.rows[idx] = row,
                    None => self.rows.push(row),
                }
            }
            Mutation::Delete(id) => self.rows.retain(|r| r.id() != Some(id)),
        }
        self.applied += 1;
    }

    pub fn snapshot(&self) -> Vec<T> {
        self.rows.clone()
    }

    pub fn get(&self, id: &ObjectId) -> Option<&T> {
        self.rows.iter().find(|r| r.id().as_ref() == Some(id))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of mutations applied since creation.
    pub fn applied(&self) -> u64 {
        self.applied
    }

    fn position(&self, id: &ObjectId) -> Option<usize> {
        self.rows.iter().position(|r| r.id().as_ref() == Some(id))
    }
}

/// A remote collection paired with its local mirror.
#[derive(Clone)]
pub struct Table<T: Record> {
    collection: Collection<T>,
    mirror: Arc<RwLock<Mirror<T>>>,
}

impl<T: Record> Table<T> {
    pub fn new(collection: Collection<T>) -> Self {
        Table {
            collection,
            mirror: Arc::new(RwLock::new(Mirror::default())),
        }
    }

    pub fn name(&self) -> &'static str {
        T::TABLE
    }

    /// Selects every row from the remote table and replaces the mirror.
    pub async fn load(&self) -> Result<usize> {
        let mut cursor = self
            .collection
            .find(doc! {})
            .await
            .with_context(|| format!("select {}", T::TABLE))?;
        let mut rows = Vec::new();
        while let Some(row) = cursor.try_next().await? {
            rows.push(row);
        }
        let count = rows.len();
        self.write().load(rows);
        tracing::debug!(table = T::TABLE, count, "mirror loaded");
        Ok(count)
    }

    /// Writes to the remote table, then mirrors the write. Returns the affected id.
    pub async fn apply(&self, mutation: Mutation<T>) -> Result<ObjectId> {
        match mutation {
            Mutation::Create(mut row) => {
                let res = self
                    .collection
                    .insert_one(&row)
                    .await
                    .with_context(|| format!("insert into {}", T::TABLE))?;
                let id = res
                    .inserted_id
                    .as_object_id()
                    .with_context(|| format!("{} insert missing _id", T::TABLE))?;
                row.set_id(id);
                self.write().apply(Mutation::Create(row));
                Ok(id)
            }
            Mutation::Update(id, mut row) => {
                row.set_id(id);
                let res = self
                    .collection
                    .replace_one(doc! { "_id": id }, &row)
                    .await
                    .with_context(|| format!("update {}", T::TABLE))?;
                if res.matched_count == 0 {
                    bail!("{} {} not found", T::TABLE, id.to_hex());
                }
                self.write().apply(Mutation::Update(id, row));
                Ok(id)
            }
            Mutation::Delete(id) => {
                let res = self
                    .collection
                    .delete_one(doc! { "_id": id })
                    .await
                    .with_context(|| format!("delete from {}", T::TABLE))?;
                if res.deleted_count == 0 {
                    bail!("{} {} not found", T::TABLE, id.to_hex());
                }
                self.write().apply(Mutation::Delete(id));
                Ok(id)
            }
        }
    }

    pub fn snapshot(&self) -> Vec<T> {
        self.read().snapshot()
    }

    pub fn get(&self, id: &ObjectId) -> Option<T> {
        self.read().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn applied(&self) -> u64 {
        self.read().applied()
    }

    fn read(&self) -> RwLockReadGuard<'_, Mirror<T>> {
        self.mirror.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Mirror<T>> {
        self.mirror.write().unwrap_or_else(PoisonError::into_inner)
    }
}
