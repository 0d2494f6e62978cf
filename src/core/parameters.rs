//! Biophysical constants of the cortical column.
//!
//! Three of them select the regime of the column and are handed over at construction as an
//! ordered list (`FreeParameters`): the pyramidal sigmoid gain, the KNa conductance and the
//! noise amplitude. Everything else keeps its published default unless a driver overrides
//! the public field before building the column.
//!
//! Defaults follow Weigenand et al., "Characterization of K-Complexes and Slow Wave Activity
//! in a Neural Mass Model", PLoS Comput Biol 10 (2014).

use anyhow::{bail, ensure, Result};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// The three regime-selecting parameters, in construction order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FreeParameters {
    /// Sigmoid gain of the pyramidal population in mV.
    pub sigma_p: f64,

    /// Conductance of the sodium-dependent potassium current.
    pub g_kna: f64,

    /// Amplitude of the background noise in ms^-1.
    pub dphi: f64,
}

impl Default for FreeParameters {
    fn default() -> Self {
        Self {
            sigma_p: 4.0,
            g_kna: 1.33,
            dphi: 2.0,
        }
    }
}

impl From<[f64; 3]> for FreeParameters {
    fn from([sigma_p, g_kna, dphi]: [f64; 3]) -> Self {
        Self {
            sigma_p,
            g_kna,
            dphi,
        }
    }
}

impl TryFrom<&[f64]> for FreeParameters {
    type Error = anyhow::Error;

    fn try_from(values: &[f64]) -> Result<Self> {
        match values {
            &[sigma_p, g_kna, dphi] => Ok(Self {
                sigma_p,
                g_kna,
                dphi,
            }),
            _ => bail!(
                "expected 3 free parameters (sigma_p, g_KNa, dphi), got {}",
                values.len()
            ),
        }
    }
}

/// All constants of the column model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnParameters {
    /// Membrane time constant of the pyramidal population in ms.
    pub tau_p: f64,
    /// Membrane time constant of the interneuron population in ms.
    pub tau_i: f64,

    /// Maximum firing rate of the pyramidal population in ms^-1.
    pub qp_max: f64,
    /// Maximum firing rate of the interneuron population in ms^-1.
    pub qi_max: f64,

    /// Sigmoid threshold (half activation) of the pyramidal population in mV.
    pub theta_p: f64,
    /// Sigmoid threshold (half activation) of the interneuron population in mV.
    pub theta_i: f64,

    /// Sigmoid gain of the pyramidal population in mV.
    pub sigma_p: f64,
    /// Sigmoid gain of the interneuron population in mV.
    pub sigma_i: f64,

    /// Scaling of the sigmoid so that `sigma` is the standard deviation of the underlying
    /// logistic distribution (`pi / sqrt(3)`).
    pub c1: f64,

    /// Sodium influx per spike in mM ms.
    pub alpha_na: f64,
    /// Sodium time constant in ms.
    pub tau_na: f64,
    /// Na-K pump constant in mM/ms.
    pub r_pump: f64,
    /// Equilibrium sodium concentration in mM.
    pub na_eq: f64,
    /// Half saturation of the pump in mM. The pump has a Hill coefficient of 3.
    pub pump_half_na: f64,

    /// Maximal open fraction of KNa channels.
    pub kna_max_open: f64,
    /// Sodium concentration of half KNa activation in mM.
    pub kna_half_na: f64,
    /// Hill coefficient of KNa activation.
    pub kna_hill: f64,

    /// PSP rise rate of excitatory synapses in ms^-1.
    pub gamma_e: f64,
    /// PSP rise rate of inhibitory synapses in ms^-1.
    pub gamma_g: f64,

    /// Leak conductance.
    pub g_l: f64,
    pub g_ampa: f64,
    pub g_gaba: f64,
    /// Sodium-dependent potassium conductance.
    pub g_kna: f64,

    /// Reversal potentials in mV.
    pub e_ampa: f64,
    pub e_gaba: f64,
    pub e_l_p: f64,
    pub e_l_i: f64,
    pub e_k: f64,

    /// Mean of the background drive in ms^-1.
    pub mphi: f64,
    /// Amplitude of the background noise in ms^-1.
    pub dphi: f64,

    /// Connectivities (dimensionless).
    pub n_pp: f64,
    pub n_ip: f64,
    pub n_pi: f64,
    pub n_ii: f64,
}

impl Default for ColumnParameters {
    fn default() -> Self {
        let free = FreeParameters::default();

        Self {
            tau_p: 30.0,
            tau_i: 30.0,
            qp_max: 30.0e-3,
            qi_max: 60.0e-3,
            theta_p: -58.5,
            theta_i: -58.5,
            sigma_p: free.sigma_p,
            sigma_i: 6.0,
            c1: PI / 3f64.sqrt(),
            alpha_na: 2.0,
            tau_na: 1.0,
            r_pump: 0.09,
            na_eq: 9.5,
            pump_half_na: 15.0,
            kna_max_open: 0.37,
            kna_half_na: 38.7,
            kna_hill: 3.5,
            gamma_e: 70.0e-3,
            gamma_g: 58.6e-3,
            g_l: 1.0,
            g_ampa: 1.0,
            g_gaba: 1.0,
            g_kna: free.g_kna,
            e_ampa: 0.0,
            e_gaba: -70.0,
            e_l_p: -66.0,
            e_l_i: -64.0,
            e_k: -100.0,
            mphi: 0.0,
            dphi: free.dphi,
            n_pp: 120.0,
            n_ip: 72.0,
            n_pi: 90.0,
            n_ii: 90.0,
        }
    }
}

impl ColumnParameters {
    /// Default constants with the given regime-selecting parameters.
    pub fn with_free(free: FreeParameters) -> Self {
        let mut parameters = Self::default();
        parameters.set_free(free);
        parameters
    }

    /// Overrides the regime-selecting parameters.
    pub fn set_free(&mut self, free: FreeParameters) {
        self.sigma_p = free.sigma_p;
        self.g_kna = free.g_kna;
        self.dphi = free.dphi;
    }

    /// The regime-selecting parameters currently in use.
    pub fn free(&self) -> FreeParameters {
        FreeParameters {
            sigma_p: self.sigma_p,
            g_kna: self.g_kna,
            dphi: self.dphi,
        }
    }

    /// Checks the constants that appear in denominators or as rates.
    ///
    /// The integrator itself never calls this: it trusts its inputs and simply propagates
    /// non-finite values. Drivers that accept user supplied parameters can reject them here.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("tau_p", self.tau_p),
            ("tau_i", self.tau_i),
            ("tau_na", self.tau_na),
            ("qp_max", self.qp_max),
            ("qi_max", self.qi_max),
            ("sigma_p", self.sigma_p),
            ("sigma_i", self.sigma_i),
            ("gamma_e", self.gamma_e),
            ("gamma_g", self.gamma_g),
            ("na_eq", self.na_eq),
            ("pump_half_na", self.pump_half_na),
            ("kna_half_na", self.kna_half_na),
        ];

        for (name, value) in positive {
            ensure!(
                value.is_finite() && value > 0.0,
                "{} must be positive and finite, got {}",
                name,
                value
            );
        }

        ensure!(
            self.dphi.is_finite() && self.dphi >= 0.0,
            "dphi must be non-negative and finite, got {}",
            self.dphi
        );

        Ok(())
    }
}
