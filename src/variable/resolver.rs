use crate::http::types::HeaderList;
use crate::variable::types::VariableContext;
use regex::{Captures, Regex};
use std::sync::OnceLock;

/// 模板变量替换器
pub struct VariableResolver;

impl VariableResolver {
    /// 替换文本中的所有 {{variable}} 占位符，未知变量保持原样
    pub fn substitute(text: &str, context: &VariableContext) -> String {
        static VAR_REGEX: OnceLock<Regex> = OnceLock::new();
        let re = VAR_REGEX.get_or_init(|| Regex::new(r"\{\{([a-zA-Z_][a-zA-Z0-9_]*)\}\}").unwrap());

        re.replace_all(text, |caps: &Captures| {
            let var_name = &caps[1];
            context.get(var_name).unwrap_or(&caps[0]).to_string()
        })
        .to_string()
    }

    /// 替换 header 模板的每个值，顺序不变
    pub fn substitute_headers(
        template: &[(&str, &str)],
        context: &VariableContext,
    ) -> HeaderList {
        template
            .iter()
            .map(|(name, value)| (*name, Self::substitute(value, context)))
            .collect()
    }

    /// 解析并替换系统环境变量 ${VAR}
    pub fn resolve_env_vars(text: &str) -> String {
        static ENV_REGEX: OnceLock<Regex> = OnceLock::new();
        let re = ENV_REGEX.get_or_init(|| Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap());

        re.replace_all(text, |caps: &Captures| {
            let env_name = &caps[1];
            std::env::var(env_name).unwrap_or_else(|_| caps[0].to_string())
        })
        .to_string()
    }
}
