//! Loopback-backed LVM volume group for nova-volume.
//!
//! Lifecycle:
//!
//! ```text
//! install:  truncate --size <N>G <file>
//! start:    losetup --show -f <file>  ──→ vgcreate <group> <dev>   (first time)
//!                                     └─→ vgchange -ay <group>     (afterwards)
//! erase:    vgchange -an ──→ vgremove -f ──→ losetup -d <dev>... ──→ rm -f <file>
//! ```

use crate::errors::{StackError, StackResult};
use crate::exec::{BoxedRunner, Invocation};
use crate::options::VolumeOptions;

pub struct VolumeGroupManager {
    runner: BoxedRunner,
    options: VolumeOptions,
}

impl VolumeGroupManager {
    pub fn new(runner: BoxedRunner, options: VolumeOptions) -> Self {
        Self { runner, options }
    }

    fn backing_file(&self) -> String {
        self.options.backing_file.display().to_string()
    }

    /// Create the sparse backing image.
    pub async fn create_backing_file(&self) -> StackResult<()> {
        tracing::info!(
            file = %self.options.backing_file.display(),
            size_gb = self.options.size_gb,
            "creating volume backing file"
        );
        self.runner
            .check(
                &Invocation::privileged("truncate")
                    .arg("--size")
                    .arg(format!("{}G", self.options.size_gb))
                    .arg(self.backing_file()),
            )
            .await?;
        Ok(())
    }

    /// Loop devices currently bound to the backing file.
    pub async fn loop_devices(&self) -> StackResult<Vec<String>> {
        let output = self
            .runner
            .check(&Invocation::privileged("losetup").args(["-j".to_string(), self.backing_file()]))
            .await?;
        Ok(parse_losetup_associations(&output.stdout))
    }

    pub async fn group_exists(&self) -> StackResult<bool> {
        let output = self
            .runner
            .run(&Invocation::privileged("vgs").arg(&self.options.group))
            .await?;
        Ok(output.is_success())
    }

    /// Bind the backing file to a loop device and make the group available.
    ///
    /// Returns the loop device in use.
    pub async fn attach(&self) -> StackResult<String> {
        let device = match self.loop_devices().await?.into_iter().next() {
            Some(device) => {
                tracing::debug!(%device, "backing file already attached");
                device
            }
            None => {
                let output = self
                    .runner
                    .check(
                        &Invocation::privileged("losetup")
                            .args(["--show".to_string(), "-f".to_string(), self.backing_file()]),
                    )
                    .await?;
                let device = output.stdout.trim().to_string();
                if device.is_empty() {
                    return Err(StackError::Internal(
                        "losetup --show did not report a loop device".into(),
                    ));
                }
                device
            }
        };

        if self.group_exists().await? {
            self.runner
                .check(&Invocation::privileged("vgchange").args(["-ay", self.options.group.as_str()]))
                .await?;
        } else {
            tracing::info!(group = %self.options.group, %device, "creating volume group");
            self.runner
                .check(&Invocation::privileged("vgcreate").args([self.options.group.as_str(), device.as_str()]))
                .await?;
        }
        Ok(device)
    }

    pub async fn deactivate(&self) -> StackResult<()> {
        self.runner
            .check(&Invocation::privileged("vgchange").args(["-an", self.options.group.as_str()]))
            .await?;
        Ok(())
    }

    pub async fn remove_group(&self) -> StackResult<()> {
        self.runner
            .check(&Invocation::privileged("vgremove").args(["-f", self.options.group.as_str()]))
            .await?;
        Ok(())
    }

    /// Detach every loop device bound to the backing file.
    pub async fn detach(&self) -> StackResult<()> {
        for device in self.loop_devices().await? {
            tracing::debug!(%device, "detaching loop device");
            self.runner
                .check(&Invocation::privileged("losetup").args(["-d", device.as_str()]))
                .await?;
        }
        Ok(())
    }

    pub async fn remove_backing_file(&self) -> StackResult<()> {
        self.runner
            .check(&Invocation::privileged("rm").args(["-f".to_string(), self.backing_file()]))
            .await?;
        Ok(())
    }
}

/// Device names from `losetup -j` output.
///
/// Lines look like `/dev/loop0: [64768]:1234 (/var/lib/nova/nova-volumes.img)`.
pub fn parse_losetup_associations(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter_map(|line| line.split_once(':'))
        .map(|(device, _)| device.trim())
        .filter(|device| device.starts_with("/dev/"))
        .map(str::to_string)
        .collect()
}
