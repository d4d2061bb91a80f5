mod config;
mod save;

use crate::config::AppConfig;
use crate::save::FsSaveWriter;
use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use env_logger::Env;
use gba_save_config::GbaSaveType;
use gba_save_core::cartridge::{self, CartridgeIdentity};
use gba_save_core::savedata::{SAVE_EXTENSION, SaveMemory};
use gba_save_core::sharkport::{self, ImportError, SharkPortError};
use std::fs;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(version, about = "Import and export GBA save files in SharkPort format")]
struct Args {
    /// Config file path; defaults to sharkport-config.toml in the user config directory
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the metadata and checksum of a SharkPort file
    Inspect {
        /// SharkPort file path
        #[arg(short = 'i', long)]
        input: PathBuf,
    },
    /// Import a SharkPort file into a raw save file
    Import(ImportArgs),
    /// Export a raw save file as a SharkPort file
    Export(ExportArgs),
}

#[derive(clap::Args)]
struct ImportArgs {
    /// ROM file path, used to identify the game
    #[arg(short = 'r', long)]
    rom_path: PathBuf,

    /// SharkPort file to import
    #[arg(short = 'i', long)]
    input: PathBuf,

    /// Save file path; defaults to the ROM file path with a .sav extension
    #[arg(short = 's', long)]
    save_path: Option<PathBuf>,

    /// Save type; if not set, uses the config default or detects from the save file or ROM
    #[arg(long)]
    save_type: Option<GbaSaveType>,

    /// Skip checksum verification; only the title is compared against the ROM header
    #[arg(long, default_value_t)]
    no_verify: bool,
}

#[derive(clap::Args)]
struct ExportArgs {
    /// ROM file path, used to identify the game
    #[arg(short = 'r', long)]
    rom_path: PathBuf,

    /// SharkPort file to write
    #[arg(short = 'o', long)]
    output: PathBuf,

    /// Save file path; defaults to the ROM file path with a .sav extension
    #[arg(short = 's', long)]
    save_path: Option<PathBuf>,

    /// Save type; if not set, uses the config default or detects from the save file or ROM
    #[arg(long)]
    save_type: Option<GbaSaveType>,
}

struct LoadedRom {
    rom: Vec<u8>,
    identity: CartridgeIdentity,
}

fn load_rom(rom_path: &Path) -> anyhow::Result<LoadedRom> {
    let rom = fs::read(rom_path)
        .with_context(|| format!("Error reading ROM from '{}'", rom_path.display()))?;
    let identity = CartridgeIdentity::from_rom(&rom)?;

    log::info!("Loaded ROM '{}' ({})", identity.title_lossy(), rom_path.display());

    Ok(LoadedRom { rom, identity })
}

fn resolve_save_type(
    explicit: Option<GbaSaveType>,
    config: &AppConfig,
    save_path: &Path,
    rom: &[u8],
) -> GbaSaveType {
    let save_type = explicit.unwrap_or(config.default_save_type);
    if save_type != GbaSaveType::Autodetect {
        return save_type;
    }

    if let Ok(metadata) = fs::metadata(save_path)
        && let Some(save_type) = GbaSaveType::from_len(metadata.len() as usize)
    {
        log::info!("Using save type {save_type} based on size of '{}'", save_path.display());
        return save_type;
    }

    cartridge::detect_save_type(rom)
}

fn run_inspect(input: &Path) -> anyhow::Result<()> {
    let file = File::open(input)
        .with_context(|| format!("Error opening SharkPort file '{}'", input.display()))?;
    let info = sharkport::read_info(&mut BufReader::new(file))?;

    println!("{info}");

    Ok(())
}

fn run_import(args: ImportArgs, config: &AppConfig) -> anyhow::Result<()> {
    let LoadedRom { rom, identity } = load_rom(&args.rom_path)?;

    let save_path = args
        .save_path
        .unwrap_or_else(|| args.rom_path.with_extension(SAVE_EXTENSION))
        .with_extension(SAVE_EXTENSION);
    let save_type = resolve_save_type(args.save_type, config, &save_path, &rom);
    let mut save = SaveMemory::load(save_type, FsSaveWriter::new(save_path.clone()));

    let file = File::open(&args.input)
        .with_context(|| format!("Error opening SharkPort file '{}'", args.input.display()))?;
    let mut reader = BufReader::new(file);

    let verify_checksum = config.verify_checksum && !args.no_verify;
    match sharkport::import_sharkport(&mut reader, &mut save, &identity, verify_checksum) {
        Ok(()) => {}
        Err(ImportError::SharkPort(err @ SharkPortError::ChecksumMismatch { .. }))
            if config.allow_unverified_fallback =>
        {
            log::warn!("{err}; retrying without checksum verification");
            sharkport::import_sharkport(&mut reader, &mut save, &identity, false)?;
        }
        Err(err) => return Err(err.into()),
    }

    log::info!("Wrote save file '{}'", save_path.display());

    Ok(())
}

fn run_export(args: ExportArgs, config: &AppConfig) -> anyhow::Result<()> {
    let LoadedRom { rom, identity } = load_rom(&args.rom_path)?;

    let save_path = args
        .save_path
        .unwrap_or_else(|| args.rom_path.with_extension(SAVE_EXTENSION))
        .with_extension(SAVE_EXTENSION);
    if !save_path.exists() {
        bail!("Save file '{}' does not exist", save_path.display());
    }

    let save_type = resolve_save_type(args.save_type, config, &save_path, &rom);
    let save = SaveMemory::try_load(save_type, FsSaveWriter::new(save_path.clone()))
        .with_context(|| format!("Error reading save file '{}'", save_path.display()))?;

    let file = File::create(&args.output)
        .with_context(|| format!("Error creating SharkPort file '{}'", args.output.display()))?;
    let mut writer = BufWriter::new(file);

    let result = sharkport::export_sharkport(&mut writer, &save, &identity)
        .map_err(anyhow::Error::from)
        .and_then(|()| writer.flush().map_err(anyhow::Error::from));
    if let Err(err) = result {
        drop(writer);
        if let Err(remove_err) = fs::remove_file(&args.output) {
            log::error!(
                "Unable to remove partially written file '{}': {remove_err}",
                args.output.display()
            );
        }
        return Err(err);
    }

    log::info!("Wrote SharkPort file '{}'", args.output.display());

    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let config_path = args.config.unwrap_or_else(config::default_config_path);
    log::debug!("Loading config from '{}'", config_path.display());
    let config = AppConfig::from_file(&config_path);

    match args.command {
        Command::Inspect { input } => run_inspect(&input),
        Command::Import(args) => run_import(args, &config),
        Command::Export(args) => run_export(args, &config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_rom(dir: &TempDir, extra: &[u8]) -> PathBuf {
        let mut rom = vec![0; 0x200];
        rom[0xA0..0xB0].copy_from_slice(b"CLI TEST\0\0\0\0ACLE");
        rom[0xB0..0xB2].copy_from_slice(b"01");
        rom[0xBD] = 0x9F;
        rom.extend_from_slice(extra);

        let path = dir.path().join("game.gba");
        fs::write(&path, rom).unwrap();
        path
    }

    fn export_args(rom_path: &Path, output: &Path) -> ExportArgs {
        ExportArgs {
            rom_path: rom_path.into(),
            output: output.into(),
            save_path: None,
            save_type: None,
        }
    }

    fn import_args(rom_path: &Path, input: &Path, save_path: &Path) -> ImportArgs {
        ImportArgs {
            rom_path: rom_path.into(),
            input: input.into(),
            save_path: Some(save_path.into()),
            save_type: None,
            no_verify: false,
        }
    }

    #[test]
    fn export_then_import_files() {
        let dir = tempfile::tempdir().unwrap();
        let rom_path = write_rom(&dir, b"FLASH1M_V103");

        let save: Vec<u8> = (0..128 * 1024).map(|i| (i * 7) as u8).collect();
        fs::write(dir.path().join("game.sav"), &save).unwrap();

        let sps_path = dir.path().join("game.sps");
        run_export(export_args(&rom_path, &sps_path), &AppConfig::default()).unwrap();

        let imported_path = dir.path().join("imported.sav");
        run_import(import_args(&rom_path, &sps_path, &imported_path), &AppConfig::default())
            .unwrap();

        assert_eq!(fs::read(&imported_path).unwrap(), save);
    }

    #[test]
    fn import_detects_save_type_from_rom() {
        let dir = tempfile::tempdir().unwrap();
        let rom_path = write_rom(&dir, b"SRAM_V113");

        let save = vec![0x42; 32 * 1024];
        fs::write(dir.path().join("game.sav"), &save).unwrap();
        let sps_path = dir.path().join("game.sps");
        run_export(export_args(&rom_path, &sps_path), &AppConfig::default()).unwrap();

        // No existing save file at the import path, so the type comes from the ROM
        let imported_path = dir.path().join("fresh.sav");
        run_import(import_args(&rom_path, &sps_path, &imported_path), &AppConfig::default())
            .unwrap();
        assert_eq!(fs::read(&imported_path).unwrap(), save);
    }

    #[test]
    fn import_without_save_type_fails() {
        let dir = tempfile::tempdir().unwrap();
        let sram_rom = write_rom(&dir, b"SRAM_V113");
        fs::write(dir.path().join("game.sav"), vec![0; 32 * 1024]).unwrap();
        let sps_path = dir.path().join("game.sps");
        run_export(export_args(&sram_rom, &sps_path), &AppConfig::default()).unwrap();

        // Same header, but no save library identifier and no existing save
        let rom_path = write_rom(&dir, b"");
        let imported_path = dir.path().join("fresh.sav");
        let err =
            run_import(import_args(&rom_path, &sps_path, &imported_path), &AppConfig::default())
                .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ImportError<save::SaveWriteError>>(),
            Some(ImportError::SharkPort(SharkPortError::UnwritableSaveType(GbaSaveType::None)))
        ));
        assert!(!imported_path.exists());
    }

    #[test]
    fn checksum_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let rom_path = write_rom(&dir, b"SRAM_V113");
        fs::write(dir.path().join("game.sav"), vec![0x11; 32 * 1024]).unwrap();
        let sps_path = dir.path().join("game.sps");
        run_export(export_args(&rom_path, &sps_path), &AppConfig::default()).unwrap();

        // Corrupt the stored checksum
        let mut sps = fs::read(&sps_path).unwrap();
        let last = sps.len() - 1;
        sps[last] ^= 0xFF;
        fs::write(&sps_path, sps).unwrap();

        let imported_path = dir.path().join("imported.sav");
        assert!(
            run_import(import_args(&rom_path, &sps_path, &imported_path), &AppConfig::default())
                .is_err()
        );

        let config = AppConfig { allow_unverified_fallback: true, ..AppConfig::default() };
        run_import(import_args(&rom_path, &sps_path, &imported_path), &config).unwrap();
        assert_eq!(fs::read(&imported_path).unwrap(), vec![0x11; 32 * 1024]);
    }

    #[test]
    fn export_fails_on_unreadable_save() {
        let dir = tempfile::tempdir().unwrap();
        let rom_path = write_rom(&dir, b"SRAM_V113");
        fs::create_dir(dir.path().join("game.sav")).unwrap();
        let sps_path = dir.path().join("game.sps");

        let err = run_export(export_args(&rom_path, &sps_path), &AppConfig::default()).unwrap_err();
        assert!(err.downcast_ref::<save::SaveWriteError>().is_some());
        assert!(!sps_path.exists());
    }

    #[test]
    fn export_requires_existing_save() {
        let dir = tempfile::tempdir().unwrap();
        let rom_path = write_rom(&dir, b"SRAM_V113");
        let sps_path = dir.path().join("game.sps");

        assert!(run_export(export_args(&rom_path, &sps_path), &AppConfig::default()).is_err());
        assert!(!sps_path.exists());
    }
}
