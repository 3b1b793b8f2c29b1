use std::env;
use std::time::Duration;

use oplock_core::nt_status::NTStatus;
use oplock_manager::config::OplockConfig;
use oplock_manager::open::{CreateDisposition, FileAccessMask, FileIdentity, OpenParameters, ShareAccess};
use oplock_manager::server::{FsControlCode, OplockManager};

const FILE: FileIdentity = FileIdentity::new(1, 0x1001);

fn main() -> anyhow::Result<()> {
    #[cfg(feature = "tracing")]
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let shard_count = env::var("OPLOCK_SHARDS")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(16);
    let config = OplockConfig::builder()
        .shard_count(shard_count)
        .default_wait_timeout(Duration::from_secs(1))
        .build()?;
    let manager = OplockManager::new(config);

    let shared = ShareAccess::READ | ShareAccess::WRITE | ShareAccess::DELETE;
    let holder = manager.create(FILE, OpenParameters::new(CreateDisposition::Create, FileAccessMask::FILE_READ_DATA, shared));

    for disposition in [CreateDisposition::Supersede, CreateDisposition::Overwrite, CreateDisposition::OverwriteIf] {
        let outcome = manager.fs_control(holder, FsControlCode::RequestOplockLevel2 as u32)?;
        println!("request level 2: {:?}", outcome.status());
        let token = outcome.into_token()
            .ok_or_else(|| anyhow::anyhow!("level 2 request completed without a pending token"))?;

        let reader = manager.create(FILE, OpenParameters::new(CreateDisposition::Open, FileAccessMask::FILE_READ_DATA, shared));
        println!("after FILE_OPEN: signaled = {}", token.is_signaled());
        manager.close(reader)?;

        let replacer = manager.create(FILE, OpenParameters::new(disposition, FileAccessMask::FILE_READ_DATA, shared));
        let reason = manager.wait_for_break(&token);
        println!("after {:?}: reason = {:?}, information = {:#x}", disposition, reason, token.information());
        if token.status() != NTStatus::StatusSuccess {
            anyhow::bail!("oplock was not broken by {:?}", disposition);
        }
        manager.close(replacer)?;
    }

    manager.close(holder)?;
    println!("stats: {:?}", manager.stats());
    Ok(())
}
