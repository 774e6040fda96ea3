use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::resolve::{SymbolTable, build_schema};
use crate::{ParseError, SchemaFile, parse_raw, read_raw_file, well_known};

/// Loads a .proto file together with the files it imports.
///
/// Imports are looked up in the include paths first, then in the directory of
/// the file that names the import, then in the directory of the requested
/// file, then among the bundled `google/protobuf/*.proto` well-known types. Imported files only contribute symbols; the returned
/// [`SchemaFile`] describes the requested file alone.
#[derive(Debug, Clone, Default)]
pub struct Loader {
    include_paths: Vec<PathBuf>,
}

impl Loader {
    pub fn new<I, P>(include_paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Loader {
            include_paths: include_paths.into_iter().map(Into::into).collect(),
        }
    }

    pub fn include_paths(&self) -> &[PathBuf] {
        &self.include_paths
    }

    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<SchemaFile, ParseError> {
        let path = path.as_ref();
        let root = read_raw_file(path)?;
        let root_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();

        let mut symbols = SymbolTable::default();
        symbols.register_file(&root);

        let mut seen: HashSet<String> = HashSet::new();
        // (import, importer name, importer directory)
        let mut pending: VecDeque<(String, String, Option<PathBuf>)> = root
            .imports
            .iter()
            .map(|import| (import.clone(), root.name.clone(), Some(root_dir.clone())))
            .collect();

        while let Some((import, importer, importer_dir)) = pending.pop_front() {
            if !seen.insert(import.clone()) {
                continue;
            }

            let (raw, dir) = if let Some(found) =
                self.locate(&import, importer_dir.as_deref(), &root_dir)
            {
                debug!(import = %import, path = %found.display(), "loading import");
                let dir = found.parent().map(Path::to_path_buf);
                (read_raw_file(&found)?, dir)
            } else if let Some(source) = well_known::source(&import) {
                debug!(import = %import, "using bundled well-known type");
                (parse_raw(&import, source)?, None)
            } else {
                return Err(ParseError::ImportNotFound {
                    import,
                    from: importer,
                });
            };

            symbols.register_file(&raw);
            pending.extend(
                raw.imports
                    .iter()
                    .map(|next| (next.clone(), import.clone(), dir.clone())),
            );
        }

        build_schema(root, &symbols)
    }

    fn locate(
        &self,
        import: &str,
        importer_dir: Option<&Path>,
        root_dir: &Path,
    ) -> Option<PathBuf> {
        self.include_paths
            .iter()
            .map(PathBuf::as_path)
            .chain(importer_dir)
            .chain(std::iter::once(root_dir))
            .map(|dir| dir.join(import))
            .find(|candidate| candidate.is_file())
    }
}
