//! Container run configuration

/// Everything needed to start the wrapped tool's container
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerConfig {
    /// Image tag to run
    pub image: String,
    /// Working directory inside the container
    pub workdir: String,
    /// Volume mounts (host:container format)
    pub volumes: Vec<String>,
    /// Published ports (host:container format)
    pub ports: Vec<String>,
    /// Explicit `uid:gid` to run as, if the engine does not map the user itself
    pub user: Option<String>,
    /// Keep stdin open
    pub interactive: bool,
    /// Allocate a TTY
    pub tty: bool,
}

impl ContainerConfig {
    /// Engine CLI arguments for `run`, up to and including the image
    pub fn run_args(&self) -> Vec<String> {
        let mut args = vec!["run".to_string(), "--rm".to_string()];

        // Interactive/TTY
        if self.interactive {
            args.push("-i".to_string());
        }
        if self.tty {
            args.push("-t".to_string());
        }

        // Working directory
        args.push("-w".to_string());
        args.push(self.workdir.clone());

        // Volumes
        for v in &self.volumes {
            args.push("-v".to_string());
            args.push(v.clone());
        }

        // Ports
        for p in &self.ports {
            args.push("-p".to_string());
            args.push(p.clone());
        }

        if let Some(ref user) = self.user {
            args.push("--user".to_string());
            args.push(user.clone());
        }

        args.push(self.image.clone());
        args
    }
}
