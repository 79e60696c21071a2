//! Archive recognition: which extractor handles which file name.

use std::path::Path;

use super::tool::Invocation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    TarGz,
    TarBz2,
    TarXz,
    Tar,
    Zip,
    Rar,
    SevenZip,
}

impl ArchiveKind {
    /// Longest suffixes first so `.tar.gz` never reads as plain `.gz`.
    const SUFFIXES: &'static [(&'static str, ArchiveKind)] = &[
        (".tar.gz", ArchiveKind::TarGz),
        (".tgz", ArchiveKind::TarGz),
        (".tar.bz2", ArchiveKind::TarBz2),
        (".tbz2", ArchiveKind::TarBz2),
        (".tar.xz", ArchiveKind::TarXz),
        (".tar", ArchiveKind::Tar),
        (".zip", ArchiveKind::Zip),
        (".rar", ArchiveKind::Rar),
        (".7z", ArchiveKind::SevenZip),
    ];

    /// Recognise an archive by its (case-insensitive) file name suffix.
    pub fn detect(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_string_lossy().to_lowercase();
        Self::SUFFIXES
            .iter()
            .find(|(suffix, _)| name.ends_with(suffix))
            .map(|&(_, kind)| kind)
    }

    /// The extractor invocation; it unpacks into the working directory.
    pub fn extractor(self, archive: &Path) -> Invocation {
        let inv = match self {
            ArchiveKind::TarGz => Invocation::new("tar").arg("xzf"),
            ArchiveKind::TarBz2 => Invocation::new("tar").arg("xjf"),
            ArchiveKind::TarXz => Invocation::new("tar").arg("xJf"),
            ArchiveKind::Tar => Invocation::new("tar").arg("xf"),
            ArchiveKind::Zip => Invocation::new("unzip"),
            ArchiveKind::Rar => Invocation::new("unrar").arg("x"),
            ArchiveKind::SevenZip => Invocation::new("7z").arg("x"),
        };
        inv.arg(archive.as_os_str())
    }
}
