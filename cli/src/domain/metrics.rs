//! JMX bean → agent metric mapping table and its `conf.yaml` rendering.
//!
//! The table is static data consumed by the agent's JMX fetcher; this module
//! only shapes it into the YAML layout the agent reads.

use serde::Serialize;
use serde_yaml::{Mapping, Value};

/// How the agent reports a sampled attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricType {
    /// Per-second rate of a monotonically increasing counter.
    Rate,
    /// Point-in-time value.
    Gauge,
}

/// Selects MBeans by domain and key properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeanSelector {
    pub domain: &'static str,
    /// `(key, value)` pairs from the bean's object name, e.g. `("type", "ThreadPool")`.
    pub properties: &'static [(&'static str, &'static str)],
}

/// One attribute collected from the beans matched by `selector`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricMapping {
    pub selector: BeanSelector,
    pub attribute: &'static str,
    pub metric_type: MetricType,
    pub alias: &'static str,
}

const fn catalina(properties: &'static [(&'static str, &'static str)]) -> BeanSelector {
    BeanSelector {
        domain: "Catalina",
        properties,
    }
}

const fn map(
    selector: BeanSelector,
    attribute: &'static str,
    metric_type: MetricType,
    alias: &'static str,
) -> MetricMapping {
    MetricMapping {
        selector,
        attribute,
        metric_type,
        alias,
    }
}

const THREAD_POOL: BeanSelector = catalina(&[("type", "ThreadPool")]);
const REQUEST_PROCESSOR: BeanSelector = catalina(&[("type", "GlobalRequestProcessor")]);
const SERVLET: BeanSelector = catalina(&[("j2eeType", "Servlet")]);
const CACHE: BeanSelector = catalina(&[("type", "Cache")]);
const JSP: BeanSelector = catalina(&[("type", "JspMonitor")]);

/// Ordered mapping shipped with the agent configuration.
pub const JMX_METRICS: &[MetricMapping] = &[
    map(THREAD_POOL, "maxThreads", MetricType::Gauge, "tomcat.threads.max"),
    map(THREAD_POOL, "currentThreadCount", MetricType::Gauge, "tomcat.threads.count"),
    map(THREAD_POOL, "currentThreadsBusy", MetricType::Gauge, "tomcat.threads.busy"),
    map(REQUEST_PROCESSOR, "bytesSent", MetricType::Rate, "tomcat.bytes_sent"),
    map(REQUEST_PROCESSOR, "bytesReceived", MetricType::Rate, "tomcat.bytes_rcvd"),
    map(REQUEST_PROCESSOR, "errorCount", MetricType::Rate, "tomcat.error_count"),
    map(REQUEST_PROCESSOR, "requestCount", MetricType::Rate, "tomcat.request_count"),
    map(REQUEST_PROCESSOR, "maxTime", MetricType::Gauge, "tomcat.max_time"),
    map(REQUEST_PROCESSOR, "processingTime", MetricType::Rate, "tomcat.processing_time"),
    map(SERVLET, "processingTime", MetricType::Rate, "tomcat.servlet.processing_time"),
    map(SERVLET, "errorCount", MetricType::Rate, "tomcat.servlet.error_count"),
    map(SERVLET, "requestCount", MetricType::Rate, "tomcat.servlet.request_count"),
    map(CACHE, "accessCount", MetricType::Rate, "tomcat.cache.access_count"),
    map(CACHE, "hitsCount", MetricType::Rate, "tomcat.cache.hits_count"),
    map(JSP, "jspCount", MetricType::Rate, "tomcat.jsp.count"),
    map(JSP, "jspReloadCount", MetricType::Rate, "tomcat.jsp.reload_count"),
];

// ── conf.yaml layout ─────────────────────────────────────────────────────────

/// JMX endpoint the agent connects to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JmxInstance {
    pub host: String,
    pub port: u16,
}

#[derive(Serialize)]
struct JmxConf<'a> {
    init_config: InitConfig,
    instances: &'a [JmxInstance],
}

#[derive(Serialize)]
struct InitConfig {
    is_jmx: bool,
    collect_default_metrics: bool,
    conf: Vec<Include>,
}

#[derive(Serialize)]
struct Include {
    include: Mapping,
}

#[derive(Serialize)]
struct AttributeSpec {
    metric_type: MetricType,
    alias: &'static str,
}

fn selector_mapping(selector: &BeanSelector) -> Mapping {
    let mut m = Mapping::new();
    m.insert("domain".into(), selector.domain.into());
    for (key, value) in selector.properties {
        m.insert((*key).into(), (*value).into());
    }
    m
}

/// Group consecutive mappings that share a selector into one `include` block,
/// preserving table order.
fn includes(table: &[MetricMapping]) -> Result<Vec<Include>, serde_yaml::Error> {
    let mut groups: Vec<(BeanSelector, Mapping)> = Vec::new();
    for mapping in table {
        let spec = serde_yaml::to_value(AttributeSpec {
            metric_type: mapping.metric_type,
            alias: mapping.alias,
        })?;
        match groups.last_mut() {
            Some((selector, attributes)) if *selector == mapping.selector => {
                attributes.insert(mapping.attribute.into(), spec);
            }
            _ => {
                let mut attributes = Mapping::new();
                attributes.insert(mapping.attribute.into(), spec);
                groups.push((mapping.selector, attributes));
            }
        }
    }

    Ok(groups
        .into_iter()
        .map(|(selector, attributes)| {
            let mut include = selector_mapping(&selector);
            include.insert("attribute".into(), Value::Mapping(attributes));
            Include { include }
        })
        .collect())
}

/// Render the agent's JMX integration `conf.yaml` for `table`.
///
/// # Errors
///
/// Returns an error if YAML serialization fails.
pub fn render_conf(
    table: &[MetricMapping],
    instances: &[JmxInstance],
) -> Result<String, serde_yaml::Error> {
    let conf = JmxConf {
        init_config: InitConfig {
            is_jmx: true,
            collect_default_metrics: true,
            conf: includes(table)?,
        },
        instances,
    };
    serde_yaml::to_string(&conf)
}
