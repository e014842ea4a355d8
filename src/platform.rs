use std::env;

/// Describes the functions runtime the adapter is executing inside.
#[derive(Clone, Debug, Default)]
pub enum FunctionPlatform {
    CloudFunctions(CloudFunctionsPlatform),
    Emulator(EmulatorPlatform),
    #[default]
    Generic,
}

impl FunctionPlatform {
    /// Attempts to infer the current platform from environment variables that the
    /// functions runtime or the local emulator inject.
    pub fn detect() -> Self {
        if let Some(platform) = EmulatorPlatform::from_env() {
            return Self::Emulator(platform);
        }

        if let Some(platform) = CloudFunctionsPlatform::from_env() {
            return Self::CloudFunctions(platform);
        }

        Self::Generic
    }

    /// Returns the deployed platform details when active.
    pub fn as_cloud_functions(&self) -> Option<&CloudFunctionsPlatform> {
        match self {
            FunctionPlatform::CloudFunctions(platform) => Some(platform),
            _ => None,
        }
    }

    /// Indicates whether the adapter runs inside the local functions emulator.
    pub fn is_emulator(&self) -> bool {
        matches!(self, FunctionPlatform::Emulator(_))
    }

    /// Best-effort name of the function currently being served.
    pub fn function_name(&self) -> Option<&str> {
        match self {
            FunctionPlatform::CloudFunctions(platform) => platform
                .function_target
                .as_deref()
                .or(platform.service.as_deref()),
            FunctionPlatform::Emulator(platform) => platform.function_target.as_deref(),
            FunctionPlatform::Generic => None,
        }
    }

    /// Short label used in log fields.
    pub fn label(&self) -> &'static str {
        match self {
            FunctionPlatform::CloudFunctions(_) => "cloud_functions",
            FunctionPlatform::Emulator(_) => "emulator",
            FunctionPlatform::Generic => "generic",
        }
    }
}

/// Deployed functions runtime configuration gleaned from environment variables.
#[derive(Clone, Debug, Default)]
pub struct CloudFunctionsPlatform {
    pub function_target: Option<String>,
    pub service: Option<String>,
    pub revision: Option<String>,
    pub project_id: Option<String>,
    pub region: Option<String>,
}

impl CloudFunctionsPlatform {
    fn from_env() -> Option<Self> {
        let function_target = env::var("FUNCTION_TARGET").ok();
        let service = env::var("K_SERVICE").ok();
        let revision = env::var("K_REVISION").ok();
        let project_id = project_id_from_env();
        let region = env::var("FUNCTION_REGION")
            .ok()
            .or_else(|| env::var("GOOGLE_CLOUD_REGION").ok());

        let has_functions_env = function_target.is_some() || service.is_some();

        if has_functions_env {
            Some(Self {
                function_target,
                service,
                revision,
                project_id,
                region,
            })
        } else {
            None
        }
    }
}

/// Local emulator configuration.
#[derive(Clone, Debug, Default)]
pub struct EmulatorPlatform {
    pub function_target: Option<String>,
    pub project_id: Option<String>,
}

impl EmulatorPlatform {
    fn from_env() -> Option<Self> {
        let enabled = env::var("FUNCTIONS_EMULATOR")
            .map(|value| value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        enabled.then(|| Self {
            function_target: env::var("FUNCTION_TARGET").ok(),
            project_id: project_id_from_env(),
        })
    }
}

fn project_id_from_env() -> Option<String> {
    env::var("GCLOUD_PROJECT")
        .ok()
        .or_else(|| env::var("GOOGLE_CLOUD_PROJECT").ok())
}
