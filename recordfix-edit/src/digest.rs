use crate::error::{EditError, EditResult};
use camino::Utf8PathBuf;
use recordfix_model::SemanticModel;
use recordfix_types::ElementId;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// SHA-256 of one declaration's rendered source at prepare time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclarationDigest {
    pub declaration: ElementId,
    pub file: Utf8PathBuf,
    pub sha256: String,
}

/// Digests of every declaration a conversion will touch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preconditions {
    pub digests: Vec<DeclarationDigest>,
}

impl Preconditions {
    /// Record the current digest of each declaration, skipping repeats.
    pub fn capture(
        model: &dyn SemanticModel,
        declarations: impl IntoIterator<Item = ElementId>,
    ) -> EditResult<Self> {
        let mut digests: Vec<DeclarationDigest> = Vec::new();
        for id in declarations {
            if digests.iter().any(|d| d.declaration == id) {
                continue;
            }
            let decl = model
                .declaration(id)
                .ok_or_else(|| anyhow::anyhow!("declaration {id} not found"))?;
            digests.push(DeclarationDigest {
                declaration: id,
                file: decl.file.clone(),
                sha256: sha256_hex(decl.render().as_bytes()),
            });
        }
        Ok(Self { digests })
    }

    /// Fail with [`EditError::PreconditionMismatch`] listing every declaration that changed or
    /// disappeared.
    pub fn verify(&self, model: &dyn SemanticModel) -> EditResult<()> {
        let mut failures = Vec::new();
        for digest in &self.digests {
            match model.declaration(digest.declaration) {
                None => failures.push(format!(
                    "{} ({}): declaration missing",
                    digest.declaration, digest.file
                )),
                Some(decl) => {
                    let actual = sha256_hex(decl.render().as_bytes());
                    if actual != digest.sha256 {
                        failures.push(format!(
                            "{} ({}): sha mismatch: expected {}, got {}",
                            model.describe(digest.declaration),
                            digest.file,
                            digest.sha256,
                            actual
                        ));
                    }
                }
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(EditError::PreconditionMismatch {
                message: failures.join("; "),
            })
        }
    }

    pub fn len(&self) -> usize {
        self.digests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digests.is_empty()
    }
}

pub(crate) fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
